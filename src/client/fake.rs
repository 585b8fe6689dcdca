//! In-process fake HTTP client for unit and integration tests
//!
//! [`FakeHttpClient`] serves canned [`HttpResponse`]s keyed by URL and records
//! every URL it was asked for, so tests can assert both on the outcome of a
//! discovery call and on whether a network call was attempted at all.
//!
//! Unknown URLs answer `404 Not Found`.
//!
//! # Example
//!
//! ```
//! use prm_discovery::client::fake::FakeHttpClient;
//! use prm_discovery::client::{HttpClient, HttpResponse};
//! use url::Url;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = FakeHttpClient::new().respond(
//!     "https://rs.example.com/prm",
//!     HttpResponse::json(&serde_json::json!({"resource": "https://rs.example.com"})),
//! );
//!
//! let url = Url::parse("https://rs.example.com/prm").unwrap();
//! let resp = client.get(&url).await.unwrap();
//! assert_eq!(resp.status, reqwest::StatusCode::OK);
//! assert_eq!(client.requests(), vec![url]);
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::StatusCode;
use url::Url;

use crate::client::{HttpClient, HttpResponse};

#[derive(Debug, Clone)]
enum FakeRoute {
    Respond(HttpResponse),
    Fail(String),
    Hang,
}

/// [`HttpClient`] that answers from an in-memory route table.
#[derive(Debug, Default)]
pub struct FakeHttpClient {
    routes: HashMap<String, FakeRoute>,
    requests: Mutex<Vec<Url>>,
}

impl FakeHttpClient {
    /// Creates a client with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `response` for GETs to `url`.
    pub fn respond(mut self, url: &str, response: HttpResponse) -> Self {
        self.routes.insert(route_key(url), FakeRoute::Respond(response));
        self
    }

    /// Fails GETs to `url` with a transport error carrying `message`.
    pub fn fail(mut self, url: &str, message: impl Into<String>) -> Self {
        self.routes
            .insert(route_key(url), FakeRoute::Fail(message.into()));
        self
    }

    /// Never completes GETs to `url`; used to exercise cancellation.
    pub fn hang(mut self, url: &str) -> Self {
        self.routes.insert(route_key(url), FakeRoute::Hang);
        self
    }

    /// Returns every URL requested so far, in order.
    pub fn requests(&self) -> Vec<Url> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Normalises a route URL the same way `Url` serialises request URLs.
fn route_key(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait::async_trait]
impl HttpClient for FakeHttpClient {
    async fn get(&self, url: &Url) -> anyhow::Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.clone());

        match self.routes.get(url.as_str()).cloned() {
            Some(FakeRoute::Respond(response)) => Ok(response),
            Some(FakeRoute::Fail(message)) => Err(anyhow::anyhow!(message)),
            Some(FakeRoute::Hang) => std::future::pending::<anyhow::Result<HttpResponse>>().await,
            None => Ok(HttpResponse::new(StatusCode::NOT_FOUND).with_body("404 page not found")),
        }
    }
}
