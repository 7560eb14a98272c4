pub mod csv_reader;
pub mod geojson_reader;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::config::types::CityConfig;
use crate::domain::boundary::NeighborhoodBoundaries;
use crate::domain::listing::CityListings;
use crate::error::{DashboardError, Result};
use crate::ports::listing_source::ListingSource;

/// Reads city data from CSV and GeoJSON files under a dataset directory.
pub struct FileListingSource {
    dataset_dir: PathBuf,
}

impl FileListingSource {
    pub fn new(dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
        }
    }

    /// Absolute paths are kept as-is.
    fn resolve(&self, path: &Path) -> PathBuf {
        self.dataset_dir.join(path)
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| DashboardError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[async_trait]
impl ListingSource for FileListingSource {
    async fn load_boundaries(&self, city: &CityConfig) -> Result<NeighborhoodBoundaries> {
        let path = self.resolve(&city.geojson);
        debug!(city = %city.name, path = %path.display(), "Reading boundaries");
        let bytes = read_file(&path).await?;
        geojson_reader::read_boundaries(
            &String::from_utf8_lossy(&bytes),
            &path.display().to_string(),
        )
    }

    async fn load_listings(&self, city: &CityConfig) -> Result<CityListings> {
        let path = self.resolve(&city.listings);
        debug!(city = %city.name, path = %path.display(), "Reading listings");
        let bytes = read_file(&path).await?;
        // Invalid UTF-8 is replaced rather than rejected
        let text = String::from_utf8_lossy(&bytes);
        csv_reader::read_listings(text.as_bytes(), &path.display().to_string())
    }
}
