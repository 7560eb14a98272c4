use serde::Serialize;

use super::View;
use crate::domain::amenities::parse_amenities;
use crate::domain::selection::ResolvedSelection;
use crate::repository::ListingRepository;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmenityBar {
    pub name: String,
    pub percentage: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmenitiesView {
    pub city: String,
    pub neighbourhood: String,
    pub x_title: String,
    pub y_title: String,
    /// Empty when the neighbourhood has no listing or no parseable amenities.
    pub bars: Vec<AmenityBar>,
}

/// Bars for the amenities summary on the neighbourhood's first listing row.
pub fn project_amenities(
    repo: &ListingRepository,
    selection: &ResolvedSelection,
) -> View<AmenitiesView> {
    let Some(city) = repo.listings(&selection.city) else {
        return View::invalid("Invalid city selected");
    };
    let Some(neighbourhood) = selection.neighbourhood.as_deref() else {
        return View::invalid("No neighbourhood selected");
    };

    let bars = city
        .listings
        .iter()
        .find(|l| l.neighbourhood_cleansed == neighbourhood)
        .and_then(|l| l.top_amenities_with_percentages.as_deref())
        .map(parse_amenities)
        .unwrap_or_default()
        .into_iter()
        .map(|entry| AmenityBar {
            name: entry.name,
            percentage: entry.percentage,
            count: entry.count,
        })
        .collect();

    View::Ready(AmenitiesView {
        city: selection.city.clone(),
        neighbourhood: neighbourhood.to_string(),
        x_title: "Top 10 Amenities".to_string(),
        y_title: "Presence in Listings(%)".to_string(),
        bars,
    })
}
