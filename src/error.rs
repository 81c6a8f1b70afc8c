//! Mimir error types

/// Mimir error types
#[derive(Debug, thiserror::Error)]
pub enum MimirError {
    // Network/transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("unexpected status {status} fetching {url}")]
    UnexpectedStatus { status: u16, url: String },

    // Lifecycle errors
    /// Precaching a manifest entry failed. The install attempt is aborted
    /// as a whole and any partially populated precache partition is
    /// discarded; a previously installed version stays intact.
    #[error("install failed while precaching '{resource}': {source}")]
    InstallFailed {
        resource: String,
        #[source]
        source: Box<MimirError>,
    },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MimirError {
    /// Whether this error represents a network failure.
    ///
    /// Network failures are the only errors the strategy engine recovers
    /// from by consulting a cache partition or the offline fallback page.
    /// Everything else is terminal for the request.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            MimirError::Http(_) | MimirError::UnexpectedStatus { .. }
        )
    }
}

impl From<reqwest::Error> for MimirError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => MimirError::UnexpectedStatus {
                status: status.as_u16(),
                url: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string()),
            },
            None => MimirError::Http(err.to_string()),
        }
    }
}

/// Result type alias for Mimir operations
pub type Result<T> = std::result::Result<T, MimirError>;
