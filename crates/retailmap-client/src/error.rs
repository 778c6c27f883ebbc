use thiserror::Error;

/// Errors returned by the loader and geocoder clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("search query is empty")]
    EmptyQuery,
}

impl ClientError {
    /// True when the remote rejected the request with a non-success status.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { .. })
    }
}
