//! Network access seam.
//!
//! Strategies never touch an HTTP client directly; they go through
//! [`NetworkBackend`], which the builder fills with the reqwest-backed
//! [`HttpBackend`] by default. Tests substitute counting or failing
//! backends to pin down strategy behaviour (no network call on an image
//! cache hit, fallback on network failure, and so on).
//!
//! The backend deliberately enforces no timeout of its own; it relies on
//! the underlying network stack. A response with a non-2xx status is a
//! *successful* fetch — only transport failures are errors.

use async_trait::async_trait;

use crate::types::{Method, RequestRecord, ResponseRecord};
use crate::{MimirError, Result};

/// Performs the actual network I/O for intercepted requests.
#[async_trait]
pub trait NetworkBackend: Send + Sync {
    /// Backend name for logging/debugging.
    fn name(&self) -> &str;

    /// Execute the request against the network.
    ///
    /// Returns `Err` only for transport-level failures (unreachable host,
    /// connection reset). HTTP error statuses come back as `Ok` records.
    async fn fetch(&self, request: &RequestRecord) -> Result<ResponseRecord>;
}

/// reqwest-backed [`NetworkBackend`].
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend with a default client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MimirError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a backend around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NetworkBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, request: &RequestRecord) -> Result<ResponseRecord> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
        };

        let response = self
            .client
            .request(method, request.url.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?;

        Ok(ResponseRecord {
            status,
            headers,
            body,
        })
    }
}
