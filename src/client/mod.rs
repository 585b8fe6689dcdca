//! HTTP client abstraction used by metadata discovery
//!
//! The fetcher never talks to the network directly. It goes through the
//! [`HttpClient`] trait so callers can inject their own transport (connection
//! pooling, proxies, redirect policy, TLS roots). Implementations live in
//! submodules:
//!
//! - [`http::ReqwestHttpClient`] -- production client backed by `reqwest`.
//! - [`fake::FakeHttpClient`] -- in-process fake with canned responses, used
//!   in tests.
//!
//! # Design
//!
//! The trait exposes a single `GET`. The response body is read completely by
//! the implementation before returning, so the fetcher only ever sees a
//! finished [`HttpResponse`]. Cancellation is handled by the caller dropping
//! the returned future.

pub mod fake;
pub mod http;

use std::borrow::Cow;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use url::Url;

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Complete response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates an empty response with the given status.
    ///
    /// # Examples
    ///
    /// ```
    /// use prm_discovery::client::HttpResponse;
    /// use reqwest::StatusCode;
    ///
    /// let resp = HttpResponse::new(StatusCode::NOT_FOUND);
    /// assert!(resp.body.is_empty());
    /// assert!(resp.content_type().is_none());
    /// ```
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Creates a `200 OK` response carrying `value` as `application/json`.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(StatusCode::OK)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(value.to_string())
    }

    /// Adds a header, replacing any existing value for `name`.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the `Content-Type` header, with invalid bytes replaced.
    pub fn content_type(&self) -> Option<Cow<'_, str>> {
        self.headers
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
    }
}

/// Capability to perform an HTTP GET.
///
/// Implementations must be safe for concurrent use; independent discovery
/// calls may share one client.
///
/// # Examples
///
/// ```
/// use prm_discovery::client::{HttpClient, HttpResponse};
/// use reqwest::StatusCode;
/// use url::Url;
///
/// #[derive(Debug)]
/// struct AlwaysNotFound;
///
/// #[async_trait::async_trait]
/// impl HttpClient for AlwaysNotFound {
///     async fn get(&self, _url: &Url) -> anyhow::Result<HttpResponse> {
///         Ok(HttpResponse::new(StatusCode::NOT_FOUND))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Issues a GET to `url` and returns the buffered response.
    ///
    /// # Errors
    ///
    /// Returns an error for network, DNS, TLS or body-read failures. Non-2xx
    /// statuses are not errors at this layer.
    async fn get(&self, url: &Url) -> anyhow::Result<HttpResponse>;
}
