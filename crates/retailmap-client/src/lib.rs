//! HTTP collaborators of the store locator: the retailer GeoJSON loader and
//! the geocoding client.

pub mod error;
pub mod geocoder;
pub mod loader;

pub use error::ClientError;
pub use geocoder::{Geocoder, MapboxGeocoder};
pub use loader::{parse_collection, GeoJsonLoader, RetailerLoader};

use std::time::Duration;

use reqwest::Client;

/// Shared `reqwest` client settings for both collaborators.
pub(crate) fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ClientError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}
