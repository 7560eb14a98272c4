use geojson::FeatureCollection;

use crate::domain::boundary::NeighborhoodBoundaries;
use crate::error::{DashboardError, Result};

/// Parses a city's neighbourhood `FeatureCollection`.
pub fn read_boundaries(text: &str, source: &str) -> Result<NeighborhoodBoundaries> {
    let collection: FeatureCollection = text.parse().map_err(|e| DashboardError::GeoJson {
        path: source.to_string(),
        source: Box::new(e),
    })?;
    Ok(NeighborhoodBoundaries::new(collection))
}
