use crate::app_config::{AppConfig, Environment};
use crate::geo::{Bounds, CALIFORNIA_BBOX};
use crate::ConfigError;

pub const DEFAULT_RETAILERS_URL: &str =
    "https://raw.githubusercontent.com/JonathanChiquet/wt-locations/refs/heads/main/retailers.geojson";
pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
pub const DEFAULT_USER_AGENT: &str = "retailmap/0.1 (store-locator)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parsing and validation, decoupled from the process environment so tests
/// can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let mapbox_access_token = require("MAPBOX_ACCESS_TOKEN")?;

    let env = parse_environment(&or_default("RETAILMAP_ENV", "development"));

    let bind_addr = or_default("RETAILMAP_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("RETAILMAP_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("RETAILMAP_LOG_LEVEL", "info");

    let retailers_url = or_default("RETAILMAP_RETAILERS_URL", DEFAULT_RETAILERS_URL);
    let geocoder_base_url = or_default("RETAILMAP_GEOCODER_BASE_URL", DEFAULT_GEOCODER_BASE_URL);

    let search_radius_mi = or_default("RETAILMAP_SEARCH_RADIUS_MI", "50")
        .parse::<f64>()
        .map_err(|e| invalid("RETAILMAP_SEARCH_RADIUS_MI", e.to_string()))?;
    if !search_radius_mi.is_finite() || search_radius_mi <= 0.0 {
        return Err(invalid(
            "RETAILMAP_SEARCH_RADIUS_MI",
            format!("must be a positive number of miles, got {search_radius_mi}"),
        ));
    }

    let search_bbox = match lookup("RETAILMAP_SEARCH_BBOX") {
        Ok(raw) => Bounds::parse(&raw).map_err(|reason| invalid("RETAILMAP_SEARCH_BBOX", reason))?,
        Err(_) => CALIFORNIA_BBOX,
    };
    let search_country = or_default("RETAILMAP_SEARCH_COUNTRY", "us");

    let request_timeout_secs = or_default("RETAILMAP_REQUEST_TIMEOUT_SECS", "15")
        .parse::<u64>()
        .map_err(|e| invalid("RETAILMAP_REQUEST_TIMEOUT_SECS", e.to_string()))?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "RETAILMAP_REQUEST_TIMEOUT_SECS",
            "must be at least 1 second".to_string(),
        ));
    }
    let user_agent = or_default("RETAILMAP_USER_AGENT", DEFAULT_USER_AGENT);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        mapbox_access_token,
        retailers_url,
        geocoder_base_url,
        search_radius_mi,
        search_bbox,
        search_country,
        request_timeout_secs,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
