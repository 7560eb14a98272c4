use std::io::Read;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::domain::listing::{CityListings, Listing, ListingColumn};
use crate::error::{DashboardError, Result};

/// Columns without which a listings file is unusable.
const REQUIRED_COLUMNS: [ListingColumn; 3] = [
    ListingColumn::Date,
    ListingColumn::Neighbourhood,
    ListingColumn::Price,
];

/// Parses an integer cell, also accepting integral floats such as `10.0`
/// (integer columns holding NaN are exported as floats).
fn parse_integral<T: FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse() {
        return Some(value);
    }
    let (whole, fraction) = raw.split_once('.')?;
    if whole.is_empty() || !fraction.bytes().all(|b| b == b'0') {
        return None;
    }
    whole.parse().ok()
}

fn integral_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|raw| {
        let value = parse_integral(raw);
        if value.is_none() && !raw.trim().is_empty() {
            debug!("  unparseable integer cell {raw:?}, reading as absent");
        }
        value
    }))
}

/// Why a row did not make it into the listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DroppedRow {
    MissingNeighbourhood,
    MissingPrice,
    BadDate,
}

/// One CSV row. Unparseable numeric cells read as absent rather than
/// rejecting the row.
#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(default, deserialize_with = "integral_option")]
    id: Option<i64>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    price: Option<f64>,
    #[serde(default)]
    neighbourhood_cleansed: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    review_scores_rating: Option<f64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    host_total_listings_count: Option<f64>,
    #[serde(default, deserialize_with = "integral_option")]
    number_of_reviews: Option<u32>,
    #[serde(default, deserialize_with = "integral_option")]
    host_id: Option<i64>,
    #[serde(default)]
    host_name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    reviews_per_month: Option<f64>,
    #[serde(default)]
    top_amenities_with_percentages: Option<String>,
    #[serde(
        rename = "Positivity_Score(1to5)",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    positivity_score: Option<f64>,
    #[serde(default)]
    category: Option<String>,
}

impl ListingRow {
    fn into_listing(self) -> std::result::Result<Listing, DroppedRow> {
        let neighbourhood = self
            .neighbourhood_cleansed
            .filter(|n| !n.trim().is_empty())
            .ok_or(DroppedRow::MissingNeighbourhood)?;
        let price = self
            .price
            .filter(|p| !p.is_nan())
            .ok_or(DroppedRow::MissingPrice)?;
        let date = self
            .date
            .as_deref()
            .and_then(parse_date)
            .ok_or(DroppedRow::BadDate)?;

        Ok(Listing {
            id: self.id,
            date,
            month: date.month(),
            price,
            neighbourhood_cleansed: neighbourhood,
            review_scores_rating: self.review_scores_rating.filter(|r| !r.is_nan()),
            name: self.name,
            host_total_listings_count: self.host_total_listings_count,
            number_of_reviews: self.number_of_reviews,
            host_id: self.host_id,
            host_name: self.host_name,
            reviews_per_month: self.reviews_per_month,
            top_amenities_with_percentages: self.top_amenities_with_percentages,
            positivity_score: self.positivity_score,
            category: self.category,
        })
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time, `YYYY/MM/DD`, and
/// bare `YYYY-MM` (first of the month).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()
}

/// Reads a city's listings file. `source` names the file in errors and logs.
pub fn read_listings<R: Read>(reader: R, source: &str) -> Result<CityListings> {
    let csv_err = |e: csv::Error| DashboardError::Csv {
        path: source.to_string(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().map_err(csv_err)?.clone();

    let columns: Vec<ListingColumn> = ListingColumn::ALL
        .into_iter()
        .filter(|c| headers.iter().any(|h| h == c.key()))
        .collect();
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !columns.contains(c)) {
        return Err(DashboardError::MissingColumn {
            path: source.to_string(),
            column: missing.key().to_string(),
        });
    }

    let mut listings = Vec::new();
    let mut missing_fields = 0usize;
    let mut bad_dates = 0usize;
    let mut malformed = 0usize;
    for result in reader.deserialize::<ListingRow>() {
        match result {
            Ok(row) => match row.into_listing() {
                Ok(listing) => listings.push(listing),
                Err(DroppedRow::MissingNeighbourhood | DroppedRow::MissingPrice) => {
                    missing_fields += 1;
                }
                Err(DroppedRow::BadDate) => bad_dates += 1,
            },
            Err(e) => {
                debug!("  skipping malformed row in {source}: {e}");
                malformed += 1;
            }
        }
    }
    if missing_fields > 0 {
        debug!(
            source,
            dropped = missing_fields,
            "Dropped listing rows without neighbourhood or price"
        );
    }
    if bad_dates > 0 {
        debug!(
            source,
            dropped = bad_dates,
            "Dropped listing rows with an unparseable date"
        );
    }
    if malformed > 0 {
        debug!(source, dropped = malformed, "Dropped malformed listing rows");
    }

    Ok(CityListings::new(columns, listings))
}
