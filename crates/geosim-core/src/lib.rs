pub mod app_config;
pub mod catalog;
pub mod config;
pub mod point;
pub mod records;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, Catalog, CoverageCenter};
pub use config::{load_app_config, load_app_config_from_env};
pub use point::{CoordinateError, SpatialPoint};
pub use records::{
    BoundingBox, OrderRecord, StoreLocation, ZoneRecord, DELIVERY_MINUTES_MAX, DELIVERY_MINUTES_MIN,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
