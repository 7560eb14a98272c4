use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("GeoJSON error in {path}: {source}")]
    GeoJson {
        path: String,
        source: Box<geojson::Error>,
    },

    #[error("Listings file {path} is missing required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("No city could be loaded; check data paths in the configuration")]
    NoCitiesLoaded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
