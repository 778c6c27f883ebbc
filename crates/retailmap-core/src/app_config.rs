use std::net::SocketAddr;

use crate::geo::Bounds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub mapbox_access_token: String,
    pub retailers_url: String,
    pub geocoder_base_url: String,
    pub search_radius_mi: f64,
    pub search_bbox: Bounds,
    pub search_country: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("mapbox_access_token", &"[redacted]")
            .field("retailers_url", &self.retailers_url)
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("search_radius_mi", &self.search_radius_mi)
            .field("search_bbox", &self.search_bbox)
            .field("search_country", &self.search_country)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
