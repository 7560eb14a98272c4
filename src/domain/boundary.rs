use geojson::FeatureCollection;

/// Property holding the neighbourhood name on each boundary feature.
pub const NEIGHBOURHOOD_PROPERTY: &str = "neighbourhood";
/// Feature-id path a choropleth renderer joins listing neighbourhoods on.
pub const FEATURE_ID_KEY: &str = "properties.neighbourhood";

/// Neighbourhood polygons of one city, keyed by `properties.neighbourhood`.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodBoundaries {
    collection: FeatureCollection,
}

impl NeighborhoodBoundaries {
    pub fn new(collection: FeatureCollection) -> Self {
        Self { collection }
    }

    pub fn feature_collection(&self) -> &FeatureCollection {
        &self.collection
    }

    /// Neighbourhood names of features that carry one, in file order.
    pub fn names(&self) -> Vec<&str> {
        self.collection
            .features
            .iter()
            .filter_map(|f| {
                f.properties
                    .as_ref()?
                    .get(NEIGHBOURHOOD_PROPERTY)?
                    .as_str()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }
}
