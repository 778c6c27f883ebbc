//! Fetches the static retailer GeoJSON.

use std::future::Future;

use reqwest::{Client, Url};
use serde::Deserialize;

use retailmap_core::{AppConfig, RetailerCollection, RetailerFeature};

use crate::error::ClientError;

/// Source of the full retailer set.
pub trait RetailerLoader {
    fn load(&self) -> impl Future<Output = Result<RetailerCollection, ClientError>> + Send;
}

/// Top-level shape, with features left untyped so one bad entry does not
/// reject the whole file.
#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<serde_json::Value>,
}

/// Loads a GeoJSON `FeatureCollection` from a fixed URL.
pub struct GeoJsonLoader {
    client: Client,
    url: Url,
}

impl GeoJsonLoader {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidUrl`] if `url` does not parse.
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = crate::build_http_client(timeout_secs, user_agent)?;
        let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, url })
    }

    /// # Errors
    ///
    /// See [`GeoJsonLoader::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.retailers_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RetailerLoader for GeoJsonLoader {
    async fn load(&self) -> Result<RetailerCollection, ClientError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text().await?;
        parse_collection(&body, self.url.as_str())
    }
}

/// Parses a retailer `FeatureCollection`, dropping features without a usable
/// point geometry.
///
/// # Errors
///
/// Returns [`ClientError::Deserialize`] when the document itself is not a
/// JSON object with a `features` array.
pub fn parse_collection(body: &str, context: &str) -> Result<RetailerCollection, ClientError> {
    let raw: RawCollection = serde_json::from_str(body).map_err(|e| ClientError::Deserialize {
        context: context.to_owned(),
        source: e,
    })?;

    let total = raw.features.len();
    let features: Vec<RetailerFeature> = raw
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(feature) => Some(feature),
            Err(error) => {
                tracing::debug!(index, %error, "skipping retailer feature");
                None
            }
        })
        .collect();

    let skipped = total - features.len();
    if skipped > 0 {
        tracing::warn!(skipped, total, "retailer features without usable geometry were skipped");
    }
    tracing::info!(count = features.len(), "loaded retailer collection");

    Ok(RetailerCollection::new(features))
}
