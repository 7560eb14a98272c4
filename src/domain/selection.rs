use chrono::Datelike;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::date_axis::DateAxis;

/// Table sort direction. Each sort button sets its direction directly;
/// the initial state is `Descending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Derives the direction from two monotonically increasing click
    /// counters. Ties, including 0/0, resolve to descending.
    pub fn from_clicks(ascending: u32, descending: u32) -> Self {
        if ascending > descending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Self::Ascending
    }
}

/// Metric plotted by the time-series view. The initial state is `Price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    #[default]
    Price,
    Rating,
}

impl ChartMode {
    /// Rating wins only when its counter is strictly ahead.
    pub fn from_clicks(rating: u32, price: u32) -> Self {
        if rating > price {
            Self::Rating
        } else {
            Self::Price
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::Rating => "Rating",
        }
    }
}

/// Raw selection as it arrives from the UI for one interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionInput {
    pub city: String,
    pub month_index: usize,
    pub neighbourhood: Option<String>,
    pub sort_key: Option<String>,
    pub extra_columns: Vec<String>,
    pub sort_order: SortOrder,
    pub chart_mode: ChartMode,
}

/// Concrete query parameters for one interaction cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedSelection {
    pub city: String,
    pub month: u32,
    pub date_label: String,
    pub forecast: bool,
    pub neighbourhood: Option<String>,
    pub sort_key: String,
    pub sort_order: SortOrder,
    pub chart_mode: ChartMode,
    pub columns: Vec<String>,
}

impl ResolvedSelection {
    /// Stable key for memoising projections of this selection. Field values
    /// are JSON-escaped, so no two selections share a key.
    pub fn cache_key(&self, view: &str) -> serde_json::Result<String> {
        serde_json::to_string(&(view, self))
    }
}

/// A selection no projection can serve: unknown city, unset neighbourhood,
/// slider index past the axis, or a column the city does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidSelection {
    pub reason: String,
}

impl InvalidSelection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for InvalidSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Default columns first, then requested extras, keeping the first occurrence
/// of each key.
pub fn resolve_columns(defaults: &[String], extras: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(defaults.len() + extras.len());
    for key in defaults.iter().chain(extras) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }
    columns
}

pub fn resolve(
    axis: &DateAxis,
    input: &SelectionInput,
    default_columns: &[String],
    default_sort_key: &str,
) -> Result<ResolvedSelection, InvalidSelection> {
    let entry = axis.get(input.month_index).ok_or_else(|| {
        InvalidSelection::new(format!(
            "month index {} is outside the date axis (0..{})",
            input.month_index,
            axis.len()
        ))
    })?;

    Ok(ResolvedSelection {
        city: input.city.clone(),
        month: entry.date.month(),
        date_label: entry.label.clone(),
        forecast: entry.forecast,
        neighbourhood: input.neighbourhood.clone(),
        sort_key: input
            .sort_key
            .clone()
            .unwrap_or_else(|| default_sort_key.to_string()),
        sort_order: input.sort_order,
        chart_mode: input.chart_mode,
        columns: resolve_columns(default_columns, &input.extra_columns),
    })
}

/// Visibility of the neighbourhood detail modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalState {
    #[default]
    Closed,
    Open,
}

impl ModalState {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }

    /// A click on a map region toggles the modal and selects that region's
    /// neighbourhood. A click without a location changes nothing.
    pub fn on_map_click(self, location: Option<&str>) -> (Self, Option<String>) {
        match location {
            Some(neighbourhood) => (self.toggle(), Some(neighbourhood.to_string())),
            None => (self, None),
        }
    }
}

impl From<bool> for ModalState {
    fn from(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }
}
