//! Forward geocoding against the Mapbox Places API.
//!
//! A search is constrained to a bounding box and a country, and asks for the
//! single best match among postcodes, places, localities, neighborhoods and
//! addresses.

use std::future::Future;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::Deserialize;

use retailmap_core::{AppConfig, Bounds, LngLat, SearchOrigin, CALIFORNIA_BBOX};

use crate::error::ClientError;

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
const PLACE_TYPES: &str = "postcode,place,locality,neighborhood,address";

/// Resolves free text to a search origin.
///
/// `Ok(None)` means the service answered but found nothing.
pub trait Geocoder {
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<SearchOrigin>, ClientError>> + Send;
}

impl<G: Geocoder + Send + Sync> Geocoder for std::sync::Arc<G> {
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<SearchOrigin>, ClientError>> + Send {
        (**self).geocode(query)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    center: LngLat,
    #[serde(default)]
    place_name: String,
}

/// Client for the Mapbox forward geocoding endpoint.
pub struct MapboxGeocoder {
    client: Client,
    access_token: String,
    base_url: String,
    bbox: Bounds,
    country: String,
}

impl MapboxGeocoder {
    /// Creates a client pointed at the production endpoint, searching California.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(access_token: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        Self::with_base_url(access_token, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        let client = crate::build_http_client(timeout_secs, user_agent)?;

        let normalised = base_url.trim_end_matches('/').to_owned();
        Url::parse(&normalised).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url: normalised,
            bbox: CALIFORNIA_BBOX,
            country: "us".to_owned(),
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`MapboxGeocoder::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Ok(Self::with_base_url(
            &config.mapbox_access_token,
            config.request_timeout_secs,
            &config.user_agent,
            &config.geocoder_base_url,
        )?
        .with_search_area(config.search_bbox, &config.search_country))
    }

    /// Overrides the bounding box and country filter.
    #[must_use]
    pub fn with_search_area(mut self, bbox: Bounds, country: &str) -> Self {
        self.bbox = bbox;
        self.country = country.to_owned();
        self
    }

    /// Builds `<base>/<encoded query>.json?...` with every parameter encoded.
    fn build_url(&self, query: &str) -> Result<Url, ClientError> {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC);
        let raw = format!("{}/{encoded}.json", self.base_url);
        let mut url = Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("autocomplete", "true")
            .append_pair("country", &self.country)
            .append_pair("limit", "1")
            .append_pair("types", PLACE_TYPES)
            .append_pair("bbox", &self.bbox.to_query_value());
        Ok(url)
    }
}

/// The request URL without its query string, so the token stays out of logs.
fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

impl Geocoder for MapboxGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<SearchOrigin>, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::EmptyQuery);
        }

        let url = self.build_url(query)?;
        tracing::debug!(query, "geocoding search query");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(query, status = status.as_u16(), "geocoding request rejected");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact(&url),
            });
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: format!("geocode(query={query})"),
                source: e,
            })?;

        Ok(parsed.features.into_iter().next().map(|f| SearchOrigin {
            lng: f.center.lng,
            lat: f.center.lat,
            label: f.place_name,
        }))
    }
}
