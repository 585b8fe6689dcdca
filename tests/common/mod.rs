use std::time::Duration;

use prm_discovery::client::http::ReqwestHttpClient;
use prm_discovery::client::{HttpClient, HttpResponse};
use url::Url;
use wiremock::MockServer;

/// Host name tests use in `https` URLs; requests are routed to the mock.
#[allow(dead_code)]
pub const TEST_ORIGIN: &str = "https://rs.test";

/// [`HttpClient`] that sends every request to a local wiremock server.
///
/// Discovery only accepts `https` URLs while wiremock serves plain HTTP, so
/// this keeps the path and query of the requested URL and swaps the origin.
#[derive(Debug)]
pub struct LoopbackClient {
    inner: ReqwestHttpClient,
    base: Url,
}

impl LoopbackClient {
    #[allow(dead_code)]
    pub fn new(server: &MockServer) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");
        Self {
            inner: ReqwestHttpClient::new(http),
            base: Url::parse(&server.uri()).expect("mock server uri"),
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for LoopbackClient {
    async fn get(&self, url: &Url) -> anyhow::Result<HttpResponse> {
        let mut target = self.base.clone();
        target.set_path(url.path());
        target.set_query(url.query());
        self.inner.get(&target).await
    }
}

#[allow(dead_code)]
pub fn https_url(path: &str) -> String {
    format!("{TEST_ORIGIN}{path}")
}
