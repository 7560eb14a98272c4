use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One rental unit observed at a point in time, as loaded from a city's
/// listings file. `neighbourhood_cleansed` and `price` are always present;
/// rows missing either are dropped by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub month: u32,
    pub price: f64,
    pub neighbourhood_cleansed: String,
    pub review_scores_rating: Option<f64>,
    pub name: Option<String>,
    pub host_total_listings_count: Option<f64>,
    pub number_of_reviews: Option<u32>,
    pub host_id: Option<i64>,
    pub host_name: Option<String>,
    pub reviews_per_month: Option<f64>,
    pub top_amenities_with_percentages: Option<String>,
    #[serde(rename = "Positivity_Score(1to5)")]
    pub positivity_score: Option<f64>,
    pub category: Option<String>,
}

impl Listing {
    /// Builds a listing with only the required fields set. `month` is derived
    /// from `date`.
    pub fn new(date: NaiveDate, neighbourhood: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            date,
            month: date.month(),
            price,
            neighbourhood_cleansed: neighbourhood.into(),
            review_scores_rating: None,
            name: None,
            host_total_listings_count: None,
            number_of_reviews: None,
            host_id: None,
            host_name: None,
            reviews_per_month: None,
            top_amenities_with_percentages: None,
            positivity_score: None,
            category: None,
        }
    }

    pub fn cell(&self, column: ListingColumn) -> CellValue {
        fn text(v: Option<&String>) -> CellValue {
            v.map_or(CellValue::Missing, |s| CellValue::Text(s.clone()))
        }
        fn number(v: Option<f64>) -> CellValue {
            v.map_or(CellValue::Missing, CellValue::Number)
        }
        fn integer(v: Option<i64>) -> CellValue {
            v.map_or(CellValue::Missing, CellValue::Integer)
        }

        match column {
            ListingColumn::Date => CellValue::Date(self.date),
            ListingColumn::Month => CellValue::Integer(i64::from(self.month)),
            ListingColumn::Price => CellValue::Number(self.price),
            ListingColumn::Neighbourhood => CellValue::Text(self.neighbourhood_cleansed.clone()),
            ListingColumn::Rating => number(self.review_scores_rating),
            ListingColumn::Name => text(self.name.as_ref()),
            ListingColumn::HostTotalListings => number(self.host_total_listings_count),
            ListingColumn::NumberOfReviews => integer(self.number_of_reviews.map(i64::from)),
            ListingColumn::Id => integer(self.id),
            ListingColumn::HostName => text(self.host_name.as_ref()),
            ListingColumn::HostId => integer(self.host_id),
            ListingColumn::ReviewsPerMonth => number(self.reviews_per_month),
            ListingColumn::TopAmenities => text(self.top_amenities_with_percentages.as_ref()),
            ListingColumn::PositivityScore => number(self.positivity_score),
            ListingColumn::Category => text(self.category.as_ref()),
        }
    }
}

/// Columns a listings table may carry. Keys match the listings file headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListingColumn {
    Date,
    Month,
    Price,
    Neighbourhood,
    Rating,
    Name,
    HostTotalListings,
    NumberOfReviews,
    Id,
    HostName,
    HostId,
    ReviewsPerMonth,
    TopAmenities,
    PositivityScore,
    Category,
}

impl ListingColumn {
    pub const ALL: [Self; 15] = [
        Self::Date,
        Self::Month,
        Self::Price,
        Self::Neighbourhood,
        Self::Rating,
        Self::Name,
        Self::HostTotalListings,
        Self::NumberOfReviews,
        Self::Id,
        Self::HostName,
        Self::HostId,
        Self::ReviewsPerMonth,
        Self::TopAmenities,
        Self::PositivityScore,
        Self::Category,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Month => "month",
            Self::Price => "price",
            Self::Neighbourhood => "neighbourhood_cleansed",
            Self::Rating => "review_scores_rating",
            Self::Name => "name",
            Self::HostTotalListings => "host_total_listings_count",
            Self::NumberOfReviews => "number_of_reviews",
            Self::Id => "id",
            Self::HostName => "host_name",
            Self::HostId => "host_id",
            Self::ReviewsPerMonth => "reviews_per_month",
            Self::TopAmenities => "top_amenities_with_percentages",
            Self::PositivityScore => "Positivity_Score(1to5)",
            Self::Category => "category",
        }
    }
}

impl FromStr for ListingColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("unknown listing column '{s}'"))
    }
}

impl std::fmt::Display for ListingColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A single table cell. Serializes to the bare JSON value, `null` when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Missing,
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Orders two present values. Numbers compare numerically across the
    /// integer/float split; mismatched kinds fall back to their text form.
    #[allow(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Greater,
            (_, Self::Missing) => Ordering::Less,
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Integer(a), Self::Number(b)) => (*a as f64).total_cmp(b),
            (Self::Number(a), Self::Integer(b)) => a.total_cmp(&(*b as f64)),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// All listings of one city together with the columns its source file carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityListings {
    pub columns: Vec<ListingColumn>,
    pub listings: Vec<Listing>,
}

impl CityListings {
    pub fn new(columns: Vec<ListingColumn>, listings: Vec<Listing>) -> Self {
        Self { columns, listings }
    }

    /// `month` is derived at load time, so it is always part of the schema.
    pub fn has_column(&self, column: ListingColumn) -> bool {
        column == ListingColumn::Month || self.columns.contains(&column)
    }

    /// Distinct neighbourhoods in order of first appearance.
    pub fn neighbourhoods(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.listings
            .iter()
            .map(|l| l.neighbourhood_cleansed.as_str())
            .filter(|n| seen.insert(*n))
            .collect()
    }
}
