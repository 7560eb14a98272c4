use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use geojson::FeatureCollection;

use crate::config::types::{CityConfig, DashboardConfig};
use crate::domain::boundary::NeighborhoodBoundaries;
use crate::domain::listing::{CityListings, Listing, ListingColumn};
use crate::domain::selection::{ChartMode, ResolvedSelection, SortOrder};
use crate::error::{DashboardError, Result};
use crate::ports::listing_source::ListingSource;
use crate::repository::{CityData, ListingRepository};

pub fn all_columns() -> Vec<ListingColumn> {
    ListingColumn::ALL.to_vec()
}

pub fn make_listing(neighbourhood: &str, date: &str, price: f64, rating: Option<f64>) -> Listing {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let mut listing = Listing::new(date, neighbourhood, price);
    listing.review_scores_rating = rating;
    listing
}

pub fn make_boundaries(names: &[&str]) -> NeighborhoodBoundaries {
    let features: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                },
                "properties": { "neighbourhood": name }
            })
        })
        .collect();
    let collection: FeatureCollection = serde_json::json!({
        "type": "FeatureCollection",
        "features": features
    })
    .to_string()
    .parse()
    .unwrap();
    NeighborhoodBoundaries::new(collection)
}

/// Three listings in one neighbourhood across two past months and one
/// forecast month.
pub fn make_city(neighbourhood: &str) -> CityListings {
    CityListings::new(
        all_columns(),
        vec![
            make_listing(neighbourhood, "2024-01-15", 80.0, Some(4.2)),
            make_listing(neighbourhood, "2024-02-15", 90.0, Some(4.6)),
            make_listing(neighbourhood, "2024-07-15", 110.0, None),
        ],
    )
}

pub fn city_config(name: &str) -> CityConfig {
    let slug = name
        .split(',')
        .next()
        .unwrap_or(name)
        .to_lowercase()
        .replace(' ', "_");
    CityConfig {
        name: name.to_string(),
        listings: PathBuf::from(format!("{slug}_final_data.csv")),
        geojson: PathBuf::from(format!("neighbourhoods_{slug}.geojson")),
    }
}

fn listed(
    id: i64,
    neighbourhood: &str,
    date: &str,
    price: f64,
    rating: Option<f64>,
    amenities: Option<&str>,
) -> Listing {
    let mut listing = make_listing(neighbourhood, date, price, rating);
    listing.id = Some(id);
    listing.name = Some(format!("{neighbourhood} stay {id}"));
    listing.host_name = Some(format!("Host {id}"));
    listing.number_of_reviews = Some(u32::try_from(id).unwrap() * 3);
    listing.top_amenities_with_percentages = amenities.map(String::from);
    listing
}

/// Rome (Monti, Trastevere) with every column, and Lisbon (Alfama) without a
/// category column. Dates span 2024-03, 2024-04 and the forecast months
/// 2024-07 and 2024-08.
pub fn make_repository() -> ListingRepository {
    let rome = CityListings::new(
        all_columns(),
        vec![
            listed(
                1,
                "Monti",
                "2024-03-01",
                100.0,
                Some(4.5),
                Some("Wifi (120, 85.5%), Kitchen (100, 71.2%)"),
            ),
            listed(2, "Monti", "2024-03-01", 140.0, None, None),
            listed(
                6,
                "Trastevere",
                "2024-03-01",
                90.0,
                Some(4.9),
                Some("Wifi (120 85.5%), Kitchen (100, 71.2%)"),
            ),
            listed(3, "Monti", "2024-04-01", 120.0, Some(4.0), None),
            listed(9, "Monti", "2024-04-01", 110.0, Some(4.4), None),
            listed(10, "Monti", "2024-04-01", 130.0, None, None),
            listed(7, "Trastevere", "2024-04-01", 95.0, Some(4.7), None),
            listed(4, "Monti", "2024-07-01", 150.0, Some(4.2), None),
            listed(5, "Monti", "2024-08-01", 160.0, Some(4.3), None),
        ],
    );
    let lisbon = CityListings::new(
        all_columns()
            .into_iter()
            .filter(|c| *c != ListingColumn::Category)
            .collect(),
        vec![listed(8, "Alfama", "2024-03-01", 70.0, Some(4.6), None)],
    );

    let mut cities = BTreeMap::new();
    cities.insert(
        "Rome, Italy".to_string(),
        CityData::new(make_boundaries(&["Monti", "Trastevere"]), rome),
    );
    cities.insert(
        "Lisbon, Portugal".to_string(),
        CityData::new(make_boundaries(&["Alfama"]), lisbon),
    );
    ListingRepository::from_cities(cities)
}

/// Past-period selection with the default table settings.
pub fn selection(city: &str, month: u32, neighbourhood: Option<&str>) -> ResolvedSelection {
    let dashboard = DashboardConfig::default();
    ResolvedSelection {
        city: city.to_string(),
        month,
        date_label: format!("2024-{month:02}"),
        forecast: false,
        neighbourhood: neighbourhood.map(String::from),
        sort_key: dashboard.default_sort_key,
        sort_order: SortOrder::Descending,
        chart_mode: ChartMode::Price,
        columns: dashboard.default_columns,
    }
}

/// In-memory [`ListingSource`]. Cities registered without boundaries fail
/// boundary loading; unregistered cities fail both loads.
#[derive(Default)]
pub struct MockListingSource {
    cities: HashMap<String, (Option<NeighborhoodBoundaries>, CityListings)>,
}

impl MockListingSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_city(
        mut self,
        name: &str,
        boundaries: NeighborhoodBoundaries,
        listings: CityListings,
    ) -> Self {
        self.cities
            .insert(name.to_string(), (Some(boundaries), listings));
        self
    }

    #[must_use]
    pub fn with_listings_only(mut self, name: &str, listings: CityListings) -> Self {
        self.cities.insert(name.to_string(), (None, listings));
        self
    }
}

fn not_found(path: &std::path::Path) -> DashboardError {
    DashboardError::Io {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    }
}

#[async_trait]
impl ListingSource for MockListingSource {
    async fn load_boundaries(&self, city: &CityConfig) -> Result<NeighborhoodBoundaries> {
        self.cities
            .get(&city.name)
            .and_then(|(b, _)| b.clone())
            .ok_or_else(|| not_found(&city.geojson))
    }

    async fn load_listings(&self, city: &CityConfig) -> Result<CityListings> {
        self.cities
            .get(&city.name)
            .map(|(_, l)| l.clone())
            .ok_or_else(|| not_found(&city.listings))
    }
}
