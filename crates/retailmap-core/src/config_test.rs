use std::collections::HashMap;
use std::env::VarError;

use super::*;
use crate::geo::LngLat;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("MAPBOX_ACCESS_TOKEN", "pk.test-token");
    m
}

#[test]
fn parse_environment_variants() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_fails_without_access_token() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "MAPBOX_ACCESS_TOKEN"),
        "expected MissingEnvVar(MAPBOX_ACCESS_TOKEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_access_token_as_missing() {
    let mut map = HashMap::new();
    map.insert("MAPBOX_ACCESS_TOKEN", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.retailers_url, DEFAULT_RETAILERS_URL);
    assert_eq!(cfg.geocoder_base_url, DEFAULT_GEOCODER_BASE_URL);
    assert!((cfg.search_radius_mi - 50.0).abs() < f64::EPSILON);
    assert_eq!(cfg.search_bbox, CALIFORNIA_BBOX);
    assert_eq!(cfg.search_country, "us");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("RETAILMAP_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILMAP_BIND_ADDR"),
        "expected InvalidEnvVar(RETAILMAP_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn search_radius_override() {
    let mut map = full_env();
    map.insert("RETAILMAP_SEARCH_RADIUS_MI", "25.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.search_radius_mi - 25.5).abs() < f64::EPSILON);
}

#[test]
fn search_radius_must_be_positive() {
    for bad in ["0", "-5", "NaN", "inf", "fifty"] {
        let mut map = full_env();
        map.insert("RETAILMAP_SEARCH_RADIUS_MI", bad);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILMAP_SEARCH_RADIUS_MI"),
            "radius {bad:?} should be rejected, got: {result:?}"
        );
    }
}

#[test]
fn search_bbox_override() {
    let mut map = full_env();
    map.insert("RETAILMAP_SEARCH_BBOX", "-123.0, 37.0, -121.5, 38.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_bbox.min, LngLat::new(-123.0, 37.0));
    assert_eq!(cfg.search_bbox.max, LngLat::new(-121.5, 38.5));
}

#[test]
fn search_bbox_invalid() {
    let mut map = full_env();
    map.insert("RETAILMAP_SEARCH_BBOX", "-123.0,37.0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILMAP_SEARCH_BBOX"),
        "expected InvalidEnvVar(RETAILMAP_SEARCH_BBOX), got: {result:?}"
    );
}

#[test]
fn request_timeout_invalid() {
    for bad in ["soon", "0", "-1"] {
        let mut map = full_env();
        map.insert("RETAILMAP_REQUEST_TIMEOUT_SECS", bad);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILMAP_REQUEST_TIMEOUT_SECS"),
            "timeout {bad:?} should be rejected, got: {result:?}"
        );
    }
}

#[test]
fn debug_output_redacts_access_token() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("pk.test-token"), "token leaked: {debug}");
    assert!(debug.contains("[redacted]"));
}
