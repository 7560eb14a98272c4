use async_trait::async_trait;

use crate::config::types::CityConfig;
use crate::domain::boundary::NeighborhoodBoundaries;
use crate::domain::listing::CityListings;
use crate::error::Result;

/// Where a city's raw data comes from.
///
/// An error from either method means the city is unavailable; the repository
/// skips it rather than failing the whole load.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn load_boundaries(&self, city: &CityConfig) -> Result<NeighborhoodBoundaries>;

    /// Listings with `neighbourhood_cleansed` and `price` present, `month`
    /// derived from `date`.
    async fn load_listings(&self, city: &CityConfig) -> Result<CityListings>;
}
