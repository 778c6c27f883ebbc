//! Domain types, geometry and configuration shared by every retailmap crate.

pub mod app_config;
pub mod config;
pub mod geo;
pub mod retailers;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{haversine_miles, Bounds, LngLat, CALIFORNIA_BBOX, EARTH_RADIUS_MI};
pub use retailers::{
    FeatureCollection, PointGeometry, RetailerCollection, RetailerFeature, RetailerProperties,
    SearchOrigin,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
