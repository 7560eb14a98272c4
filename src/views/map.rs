use serde::Serialize;

use super::View;
use crate::config::types::{DashboardConfig, MapViewport};
use crate::domain::boundary::FEATURE_ID_KEY;
use crate::domain::listing::ListingColumn;
use crate::domain::selection::ResolvedSelection;
use crate::repository::ListingRepository;

/// Field the choropleth colors by.
pub const COLOR_FIELD: &str = "avg_price";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapRow {
    pub neighbourhood_cleansed: String,
    pub avg_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_ratings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_count: Option<u32>,
}

/// One tooltip entry; `format` is a d3-style number format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverField {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl HoverField {
    fn new(key: &str, label: &str, format: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            format: format.map(String::from),
        }
    }
}

/// Color bar spanning the filtered rows, ticked "Low" at `min` and "High" at `max`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScale {
    pub field: String,
    pub title: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub tick_labels: [String; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub city: String,
    pub month: u32,
    pub date_label: String,
    pub forecast: bool,
    pub viewport: MapViewport,
    pub feature_id_key: String,
    pub location_field: String,
    pub hover_fields: Vec<HoverField>,
    pub color_scale: ColorScale,
    pub rows: Vec<MapRow>,
}

/// Choropleth rows for the selected city and month.
///
/// Forecast periods carry no real rating or volume signal, so rating and
/// listing-count fields are left out of both rows and tooltips.
pub fn project_map(
    repo: &ListingRepository,
    selection: &ResolvedSelection,
    dashboard: &DashboardConfig,
) -> View<MapView> {
    let Some(city) = repo.city(&selection.city) else {
        return View::invalid("Invalid city selected");
    };
    let Some(viewport) = dashboard.map_view(&selection.city) else {
        return View::invalid(format!("No map view configured for {}", selection.city));
    };

    let with_ratings = !selection.forecast && city.listings.has_column(ListingColumn::Rating);
    let with_count = !selection.forecast && city.listings.has_column(ListingColumn::Name);

    let rows: Vec<MapRow> = city
        .stats
        .iter()
        .filter(|s| s.month == selection.month)
        .filter_map(|s| {
            Some(MapRow {
                neighbourhood_cleansed: s.neighbourhood_cleansed.clone(),
                avg_price: s.avg_price?,
                avg_ratings: if with_ratings { s.avg_ratings } else { None },
                listing_count: if with_count { s.listing_count } else { None },
            })
        })
        .collect();

    let mut hover_fields = vec![
        HoverField::new("neighbourhood_cleansed", "Neighborhood", None),
        HoverField::new("avg_price", "Average Price", Some(".2f")),
    ];
    if with_ratings {
        hover_fields.push(HoverField::new("avg_ratings", "Average Ratings", Some(".2f")));
    }
    if with_count {
        hover_fields.push(HoverField::new("listing_count", "Number of Listings", None));
    }

    let min = rows.iter().map(|r| r.avg_price).reduce(f64::min);
    let max = rows.iter().map(|r| r.avg_price).reduce(f64::max);

    View::Ready(MapView {
        city: selection.city.clone(),
        month: selection.month,
        date_label: selection.date_label.clone(),
        forecast: selection.forecast,
        viewport,
        feature_id_key: FEATURE_ID_KEY.to_string(),
        location_field: "neighbourhood_cleansed".to_string(),
        hover_fields,
        color_scale: ColorScale {
            field: COLOR_FIELD.to_string(),
            title: "Average Price".to_string(),
            min,
            max,
            tick_labels: ["Low".to_string(), "High".to_string()],
        },
        rows,
    })
}
