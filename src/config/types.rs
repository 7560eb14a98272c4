use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,
    #[serde(default = "default_cities")]
    pub cities: Vec<CityConfig>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            cities: default_cities(),
        }
    }
}

/// Data files for one city. Relative paths are resolved against `dataset_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CityConfig {
    pub name: String,
    pub listings: PathBuf,
    pub geojson: PathBuf,
}

/// Map viewport for a city's choropleth.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MapViewport {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    #[serde(default = "default_columns")]
    pub default_columns: Vec<String>,
    #[serde(default = "default_additional_columns")]
    pub additional_columns: Vec<String>,
    #[serde(default = "default_sort_key")]
    pub default_sort_key: String,
    #[serde(default = "default_column_labels")]
    pub column_labels: BTreeMap<String, String>,
    #[serde(default = "default_map_views")]
    pub map_views: BTreeMap<String, MapViewport>,
}

impl DashboardConfig {
    /// Display label for a column key, falling back to the key itself.
    pub fn column_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.column_labels.get(key).map_or(key, String::as_str)
    }

    pub fn map_view(&self, city: &str) -> Option<MapViewport> {
        self.map_views.get(city).copied()
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_columns: default_columns(),
            additional_columns: default_additional_columns(),
            default_sort_key: default_sort_key(),
            column_labels: default_column_labels(),
            map_views: default_map_views(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_cities() -> Vec<CityConfig> {
    [
        ("Madrid, Spain", "madrid"),
        ("Barcelona, Spain", "barcelona"),
        ("Mallorca, Spain", "mallorca"),
        ("Florence, Italy", "florence"),
        ("Milan, Italy", "milan"),
        ("Rome, Italy", "rome"),
        ("Lisbon, Portugal", "lisbon"),
    ]
    .into_iter()
    .map(|(name, slug)| CityConfig {
        name: name.to_string(),
        listings: PathBuf::from(format!("{slug}_final_data.csv")),
        geojson: PathBuf::from(format!("neighbourhoods_{slug}.geojson")),
    })
    .collect()
}

fn default_columns() -> Vec<String> {
    ["price", "review_scores_rating", "name", "id"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_additional_columns() -> Vec<String> {
    [
        "host_name",
        "number_of_reviews",
        "category",
        "Positivity_Score(1to5)",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_sort_key() -> String {
    "review_scores_rating".into()
}

fn default_column_labels() -> BTreeMap<String, String> {
    [
        ("neighbourhood_cleansed", "Neighbourhood"),
        ("name", "Name"),
        ("host_id", "Host ID"),
        ("host_name", "Host"),
        ("room_type", "Room Type"),
        ("number_of_reviews", "Reviews"),
        ("reviews_per_month", "Reviews/Month"),
        ("id", "ID"),
        ("minimum_nights", "Min. Nights"),
        ("price", "Price"),
        ("review_scores_rating", "Rating"),
        ("month", "Month"),
        ("Positivity_Score(1to5)", "Positivity_Score(1to5)(NLP)"),
        ("category", "Category(NLP)"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_map_views() -> BTreeMap<String, MapViewport> {
    [
        ("Madrid, Spain", 40.472_775, -3.703_790, 9.80),
        ("Barcelona, Spain", 41.389_785, 2.166_775, 10.9),
        ("Mallorca, Spain", 39.695_262, 3.017_571, 8.85),
        ("Florence, Italy", 43.769_562, 11.255_814, 11.0),
        ("Milan, Italy", 45.464_204, 9.189_982, 10.8),
        ("Rome, Italy", 41.902_782, 12.496_366, 9.6),
        ("Lisbon, Portugal", 38.936_946, -9.242_685, 9.0),
        ("Porto, Portugal", 41.157_944, -8.629_105, 8.9),
    ]
    .into_iter()
    .map(|(city, lat, lon, zoom)| (city.to_string(), MapViewport { lat, lon, zoom }))
    .collect()
}

fn default_max_entries() -> usize {
    256
}
