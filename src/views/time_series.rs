use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::View;
use crate::domain::listing::Listing;
use crate::domain::selection::{ChartMode, ResolvedSelection};
use crate::repository::ListingRepository;

/// Trailing points drawn as the forecast segment.
const FORECAST_POINTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    /// `None` when no listing on that date carries the metric.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesView {
    pub city: String,
    pub neighbourhood: String,
    pub mode: ChartMode,
    pub heading: String,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub tick_labels: Vec<String>,
    pub historical: Series,
    pub forecast: Series,
}

fn metric(listing: &Listing, mode: ChartMode) -> Option<f64> {
    match mode {
        ChartMode::Price => Some(listing.price),
        ChartMode::Rating => listing.review_scores_rating,
    }
}

/// Per-date mean of the chosen metric, in date order.
fn mean_by_date<'a>(
    listings: impl Iterator<Item = &'a Listing>,
    mode: ChartMode,
) -> Vec<SeriesPoint> {
    let mut groups: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for listing in listings {
        let (sum, count) = groups.entry(listing.date).or_default();
        if let Some(v) = metric(listing, mode) {
            *sum += v;
            *count += 1;
        }
    }
    groups
        .into_iter()
        .map(|(date, (sum, count))| SeriesPoint {
            date,
            value: (count > 0).then(|| sum / f64::from(count)),
        })
        .collect()
}

/// Splits into the historical head and the forecast tail of the last
/// `FORECAST_POINTS` points. The head runs up to and including the first
/// forecast point so both segments join.
fn split_forecast(points: &[SeriesPoint]) -> (&[SeriesPoint], &[SeriesPoint]) {
    let boundary = points.len().saturating_sub(FORECAST_POINTS);
    if boundary == 0 {
        return (&[], points);
    }
    (&points[..=boundary], &points[boundary..])
}

pub fn project_time_series(
    repo: &ListingRepository,
    selection: &ResolvedSelection,
) -> View<TimeSeriesView> {
    let Some(city) = repo.listings(&selection.city) else {
        return View::invalid("Invalid city selected");
    };
    let Some(neighbourhood) = selection.neighbourhood.as_deref() else {
        return View::invalid("No neighbourhood selected");
    };

    let mode = selection.chart_mode;
    let points = mean_by_date(
        city.listings
            .iter()
            .filter(|l| l.neighbourhood_cleansed == neighbourhood),
        mode,
    );
    let (historical, forecast) = split_forecast(&points);
    let label = mode.label();

    View::Ready(TimeSeriesView {
        city: selection.city.clone(),
        neighbourhood: neighbourhood.to_string(),
        mode,
        heading: format!("{label} Over Time"),
        title: format!("{label} Over Time in {neighbourhood}"),
        x_title: "Date".to_string(),
        y_title: label.to_string(),
        tick_labels: points
            .iter()
            .map(|p| p.date.format("%Y-%m").to_string())
            .collect(),
        historical: Series {
            name: format!("Mean {label}"),
            points: historical.to_vec(),
        },
        forecast: Series {
            name: format!("Forecasted {label}"),
            points: forecast.to_vec(),
        },
    })
}
