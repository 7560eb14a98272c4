use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::config::types::CityConfig;
use crate::domain::aggregation::{NeighborhoodMonthStat, aggregate};
use crate::domain::boundary::NeighborhoodBoundaries;
use crate::domain::date_axis::DateAxis;
use crate::domain::listing::CityListings;
use crate::error::{DashboardError, Result};
use crate::ports::listing_source::ListingSource;

/// Everything loaded for one city.
#[derive(Debug, Clone)]
pub struct CityData {
    pub boundaries: NeighborhoodBoundaries,
    pub stats: Vec<NeighborhoodMonthStat>,
    pub listings: CityListings,
}

impl CityData {
    /// Aggregates the listings once; stats are never recomputed afterwards.
    pub fn new(boundaries: NeighborhoodBoundaries, listings: CityListings) -> Self {
        let stats = aggregate(&listings);
        Self {
            boundaries,
            stats,
            listings,
        }
    }
}

/// Read-only store of every successfully loaded city.
///
/// Built once at startup and shared by reference; a reload builds a new
/// repository and swaps it in whole.
#[derive(Debug, Clone, Default)]
pub struct ListingRepository {
    cities: BTreeMap<String, CityData>,
    date_axis: DateAxis,
}

impl ListingRepository {
    pub fn from_cities(cities: BTreeMap<String, CityData>) -> Self {
        let date_axis = DateAxis::from_dates(
            cities
                .values()
                .flat_map(|c| c.listings.listings.iter().map(|l| l.date)),
        );
        Self { cities, date_axis }
    }

    /// Loads each configured city. A city whose boundaries or listings
    /// cannot be read is logged and left out; no city at all is an error.
    pub async fn load(source: &dyn ListingSource, configs: &[CityConfig]) -> Result<Self> {
        let mut cities = BTreeMap::new();

        for config in configs {
            let boundaries = match source.load_boundaries(config).await {
                Ok(b) => b,
                Err(e) => {
                    warn!(city = %config.name, error = %e, "Boundaries unavailable, skipping city");
                    continue;
                }
            };
            let listings = match source.load_listings(config).await {
                Ok(l) => l,
                Err(e) => {
                    warn!(city = %config.name, error = %e, "Listings unavailable, skipping city");
                    continue;
                }
            };

            let data = CityData::new(boundaries, listings);
            info!(
                city = %config.name,
                listings = data.listings.listings.len(),
                neighbourhoods = data.boundaries.len(),
                groups = data.stats.len(),
                "Loaded city"
            );
            cities.insert(config.name.clone(), data);
        }

        if cities.is_empty() {
            return Err(DashboardError::NoCitiesLoaded);
        }
        Ok(Self::from_cities(cities))
    }

    pub fn city(&self, name: &str) -> Option<&CityData> {
        self.cities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cities.contains_key(name)
    }

    pub fn city_names(&self) -> impl Iterator<Item = &str> {
        self.cities.keys().map(String::as_str)
    }

    pub fn boundaries(&self, city: &str) -> Option<&NeighborhoodBoundaries> {
        self.city(city).map(|c| &c.boundaries)
    }

    pub fn stats(&self, city: &str) -> Option<&[NeighborhoodMonthStat]> {
        self.city(city).map(|c| c.stats.as_slice())
    }

    pub fn listings(&self, city: &str) -> Option<&CityListings> {
        self.city(city).map(|c| &c.listings)
    }

    pub fn date_axis(&self) -> &DateAxis {
        &self.date_axis
    }
}
