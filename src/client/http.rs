//! `reqwest`-backed [`HttpClient`]
//!
//! [`ReqwestHttpClient`] wraps a shared [`reqwest::Client`] and buffers the
//! response body up to a configurable limit. Timeouts, proxies and redirect
//! policy are whatever the wrapped client was built with.

use std::time::Duration;

use bytes::BytesMut;
use url::Url;

use crate::client::{HttpClient, HttpResponse};
use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};

/// Default cap on the metadata response body (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;

/// Production [`HttpClient`] backed by `reqwest`.
///
/// # Examples
///
/// ```
/// use prm_discovery::client::http::ReqwestHttpClient;
///
/// let client = ReqwestHttpClient::new(reqwest::Client::new()).with_max_body_bytes(64 * 1024);
/// assert_eq!(client.max_body_bytes(), 64 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    /// Underlying reqwest HTTP client.
    client: reqwest::Client,
    /// Bodies larger than this are rejected as a transport failure.
    max_body_bytes: usize,
}

impl ReqwestHttpClient {
    /// Wraps an existing `reqwest::Client` with the default body limit.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Overrides the body size limit.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Returns the body size limit in bytes.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Builds a client from the `http` section of a [`DiscoveryConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Config`] if the reqwest client cannot be
    /// constructed (for example when TLS initialisation fails).
    ///
    /// # Examples
    ///
    /// ```
    /// use prm_discovery::client::http::ReqwestHttpClient;
    /// use prm_discovery::config::DiscoveryConfig;
    ///
    /// let config = DiscoveryConfig::default();
    /// let client = ReqwestHttpClient::from_config(&config).unwrap();
    /// assert_eq!(client.max_body_bytes(), config.http.max_body_bytes);
    /// ```
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .user_agent(config.http.user_agent.as_str())
            .build()
            .map_err(|e| DiscoveryError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::new(client).with_max_body_bytes(config.http.max_body_bytes))
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> anyhow::Result<HttpResponse> {
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        let headers = response.headers().clone();

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_body_bytes {
                anyhow::bail!("response body exceeds {} bytes", self.max_body_bytes);
            }
            body.extend_from_slice(&chunk);
        }

        tracing::trace!(%url, %status, body_len = body.len(), "GET complete");

        Ok(HttpResponse {
            status,
            headers,
            body: body.freeze(),
        })
    }
}
