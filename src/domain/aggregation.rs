#![allow(clippy::cast_precision_loss)] // Group sizes are small enough for f64

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::listing::{CityListings, ListingColumn};

/// Summary of one (neighbourhood, month) group of a city's listings.
///
/// Statistics whose source column is absent from the city's file are `None`
/// for every group and skipped on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodMonthStat {
    pub neighbourhood_cleansed: String,
    pub month: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_ratings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_reviews: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_count: Option<u32>,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

#[derive(Default)]
struct Group {
    price: Mean,
    rating: Mean,
    reviews: Mean,
    rows: u32,
}

/// Groups listings by (neighbourhood, month), ordered by neighbourhood then month.
///
/// Ratings and review counts use standard mean semantics: rows without a value
/// do not count toward that statistic's denominator. Groups exist only for
/// combinations present in the data.
pub fn aggregate(city: &CityListings) -> Vec<NeighborhoodMonthStat> {
    let has_price = city.has_column(ListingColumn::Price);
    let has_rating = city.has_column(ListingColumn::Rating);
    let has_reviews = city.has_column(ListingColumn::NumberOfReviews);
    let has_name = city.has_column(ListingColumn::Name);

    let mut groups: BTreeMap<(&str, u32), Group> = BTreeMap::new();
    for listing in &city.listings {
        let group = groups
            .entry((listing.neighbourhood_cleansed.as_str(), listing.month))
            .or_default();
        group.price.push(Some(listing.price));
        group.rating.push(listing.review_scores_rating);
        group.reviews.push(listing.number_of_reviews.map(f64::from));
        group.rows += 1;
    }

    groups
        .into_iter()
        .map(|((neighbourhood, month), group)| NeighborhoodMonthStat {
            neighbourhood_cleansed: neighbourhood.to_string(),
            month,
            avg_price: if has_price { group.price.value() } else { None },
            avg_ratings: if has_rating { group.rating.value() } else { None },
            number_of_reviews: if has_reviews { group.reviews.value() } else { None },
            listing_count: has_name.then_some(group.rows),
        })
        .collect()
}
