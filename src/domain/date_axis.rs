use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Year whose second half the bundled dataset extends by forecast.
pub const FORECAST_YEAR: i32 = 2024;
/// Months after this one in `FORECAST_YEAR` are forecasts.
pub const FORECAST_AFTER_MONTH: u32 = 6;

/// Number of trailing axis positions labelled as forecast periods.
const FORECAST_TAIL: usize = 2;

/// Fixed rule tied to the bundled dataset's date range; not a general model.
pub fn is_forecast_date(date: NaiveDate) -> bool {
    date.year() == FORECAST_YEAR && date.month() > FORECAST_AFTER_MONTH
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisEntry {
    pub index: usize,
    pub date: NaiveDate,
    /// `YYYY-MM` slider label.
    pub label: String,
    /// Display-only marker on the last two positions of an axis longer than two.
    pub forecast_label: bool,
    /// Drives hover suppression on the map; see [`is_forecast_date`].
    pub forecast: bool,
}

/// Sorted, deduplicated dates found across all loaded cities, addressed by
/// slider index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateAxis {
    entries: Vec<AxisEntry>,
}

impl DateAxis {
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();

        let len = dates.len();
        let entries = dates
            .into_iter()
            .enumerate()
            .map(|(index, date)| AxisEntry {
                index,
                date,
                label: date.format("%Y-%m").to_string(),
                forecast_label: len > FORECAST_TAIL && index >= len - FORECAST_TAIL,
                forecast: is_forecast_date(date),
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, index: usize) -> Option<&AxisEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[AxisEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
