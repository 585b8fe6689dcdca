//! Secure fetch and validation of a Protected Resource Metadata document
//!
//! [`fetch_protected_resource_metadata`] is the trust boundary of this crate.
//! The document and the URL it came from are controlled by the resource
//! server, so every step below is a guard that returns on the first failure:
//!
//! 1. the metadata URL must be `https`
//! 2. one GET through the injected [`HttpClient`], raced against cancellation
//! 3. the status must be `200 OK`
//! 4. the `Content-Type` must be a JSON media type
//! 5. the body must decode as [`ProtectedResourceMetadata`]
//! 6. `resource` must equal the expected identifier byte for byte
//! 7. every `authorization_servers` entry must be an `https` URL
//!
//! Nothing is retried and nothing is cached.

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::{HttpClient, HttpResponse};
use crate::error::{DiscoveryError, Result};
use crate::metadata::ProtectedResourceMetadata;

/// The only scheme accepted for metadata and authorization server URLs.
const ALLOWED_SCHEME: &str = "https";

/// Fetches and validates the metadata document at `metadata_url`.
///
/// # Arguments
///
/// * `cancel` - Aborts the in-flight request when cancelled.
/// * `metadata_url` - HTTPS URL of the metadata document.
/// * `client` - Transport used for the single GET.
/// * `expected_resource` - Identifier the document must declare as its
///   `resource`, compared without normalisation.
///
/// # Errors
///
/// Returns the [`DiscoveryError`] variant of the first failed check; see the
/// module documentation for the order. Cancellation is reported as
/// [`DiscoveryError::TransportFailure`].
///
/// # Examples
///
/// ```
/// use prm_discovery::client::fake::FakeHttpClient;
/// use prm_discovery::client::HttpResponse;
/// use prm_discovery::fetch::fetch_protected_resource_metadata;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let client = FakeHttpClient::new().respond(
///     "https://rs.example.com/.well-known/oauth-protected-resource",
///     HttpResponse::json(&serde_json::json!({
///         "resource": "https://rs.example.com",
///         "authorization_servers": ["https://as.example.com"]
///     })),
/// );
///
/// let meta = fetch_protected_resource_metadata(
///     &CancellationToken::new(),
///     "https://rs.example.com/.well-known/oauth-protected-resource",
///     &client,
///     "https://rs.example.com",
/// )
/// .await
/// .unwrap();
/// assert_eq!(meta.authorization_servers, vec!["https://as.example.com"]);
/// # }
/// ```
pub async fn fetch_protected_resource_metadata(
    cancel: &CancellationToken,
    metadata_url: &str,
    client: &dyn HttpClient,
    expected_resource: &str,
) -> Result<ProtectedResourceMetadata> {
    let url = require_https(metadata_url)?;

    tracing::debug!(%url, expected_resource, "Fetching protected resource metadata");

    let response = tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            tracing::debug!(%url, "Metadata fetch cancelled");
            return Err(DiscoveryError::TransportFailure {
                url: metadata_url.to_string(),
                message: "request cancelled".to_string(),
            });
        }

        result = client.get(&url) => result.map_err(|e| DiscoveryError::TransportFailure {
            url: metadata_url.to_string(),
            message: format!("{e:#}"),
        })?,
    };

    check_status(&response)?;
    check_content_type(&response)?;

    let metadata: ProtectedResourceMetadata =
        serde_json::from_slice(&response.body).map_err(DiscoveryError::MalformedDocument)?;

    if metadata.resource != expected_resource {
        tracing::warn!(
            got = %metadata.resource,
            want = expected_resource,
            "Metadata resource does not match expected resource"
        );
        return Err(DiscoveryError::ResourceMismatch {
            got: metadata.resource,
            want: expected_resource.to_string(),
        });
    }

    for server in &metadata.authorization_servers {
        check_url_scheme(server).map_err(|reason| {
            tracing::warn!(server = %server, %reason, "Rejected authorization server URL");
            DiscoveryError::InvalidAuthServerUrl {
                url: server.clone(),
                reason,
            }
        })?;
    }

    tracing::debug!(
        resource = %metadata.resource,
        authorization_servers = metadata.authorization_servers.len(),
        "Protected resource metadata validated"
    );

    Ok(metadata)
}

/// Parses `raw` and requires the `https` scheme.
///
/// A URL that does not parse cannot be shown to be HTTPS and is rejected the
/// same way.
pub(crate) fn require_https(raw: &str) -> Result<Url> {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == ALLOWED_SCHEME => Ok(url),
        _ => {
            tracing::warn!(url = raw, "Rejected non-HTTPS metadata URL");
            Err(DiscoveryError::InsecureTransport {
                url: raw.to_string(),
            })
        }
    }
}

fn check_status(response: &HttpResponse) -> Result<()> {
    if response.status == StatusCode::OK {
        return Ok(());
    }

    tracing::warn!(status = %response.status, "Unexpected metadata response status");
    Err(DiscoveryError::UnexpectedStatus {
        status: response.status.as_u16(),
        reason: response.status.canonical_reason().map(str::to_string),
    })
}

fn check_content_type(response: &HttpResponse) -> Result<()> {
    let content_type = response
        .content_type()
        .map(|value| value.into_owned())
        .unwrap_or_default();

    if is_json_media_type(&content_type) {
        return Ok(());
    }

    tracing::warn!(content_type = %content_type, "Unexpected metadata content type");
    Err(DiscoveryError::UnexpectedContentType { content_type })
}

/// `application/json` or an `application/*+json` structured-syntax type,
/// ignoring parameters such as `charset`.
fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Checks that `raw` parses as a URL with the `https` scheme.
///
/// Returns the human-readable reason on failure.
fn check_url_scheme(raw: &str) -> std::result::Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != ALLOWED_SCHEME {
        return Err(format!("URL has disallowed scheme {:?}", url.scheme()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    use crate::client::fake::FakeHttpClient;
    use crate::error::ErrorKind;

    const WANT_RESOURCE: &str = "https://resource.example.com";
    const BASE: &str = "https://rs.test";

    fn url(path: &str) -> String {
        format!("{BASE}{path}")
    }

    fn ok_document() -> serde_json::Value {
        serde_json::json!({
            "resource": WANT_RESOURCE,
            "authorization_servers": ["https://as.example.com"]
        })
    }

    fn test_client() -> FakeHttpClient {
        FakeHttpClient::new()
            .respond(&url("/ok"), HttpResponse::json(&ok_document()))
            .respond(
                &url("/mismatched-resource"),
                HttpResponse::json(&serde_json::json!({"resource": "https://wrong.example.com"})),
            )
            .respond(
                &url("/bad-auth-server"),
                HttpResponse::json(&serde_json::json!({
                    "resource": WANT_RESOURCE,
                    "authorization_servers": ["javascript:alert(1)"]
                })),
            )
            .respond(
                &url("/bad-content-type"),
                HttpResponse::new(StatusCode::OK)
                    .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
                    .with_body("not json"),
            )
            .respond(
                &url("/bad-json"),
                HttpResponse::new(StatusCode::OK)
                    .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .with_body("not-json"),
            )
            .fail(&url("/unreachable"), "dial tcp 127.0.0.1:0: connection refused")
            .hang(&url("/hang"))
    }

    async fn fetch(
        client: &FakeHttpClient,
        metadata_url: &str,
    ) -> Result<ProtectedResourceMetadata> {
        fetch_protected_resource_metadata(
            &CancellationToken::new(),
            metadata_url,
            client,
            WANT_RESOURCE,
        )
        .await
    }

    #[tokio::test]
    async fn test_fetch_success_returns_document() {
        let client = test_client();
        let meta = fetch(&client, &url("/ok")).await.unwrap();

        let want: ProtectedResourceMetadata = serde_json::from_value(ok_document()).unwrap();
        assert_eq!(meta, want);
        assert_eq!(meta.resource, WANT_RESOURCE);
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_rejects_plain_http_without_network_call() {
        let client = test_client();
        let err = fetch(&client, "http://example.com").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsecureTransport);
        assert!(err
            .to_string()
            .contains(r#"resource URL "http://example.com" does not use HTTPS"#));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_other_schemes_and_garbage() {
        let client = test_client();
        for bad in ["ftp://example.com/prm", "file:///etc/passwd", "not a url", ""] {
            let err = fetch(&client, bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InsecureTransport, "input: {bad:?}");
        }
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let err = fetch(&test_client(), &url("/unreachable")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        let msg = err.to_string();
        assert!(msg.contains(r#"GET "https://rs.test/unreachable""#), "got: {msg}");
        assert!(msg.contains("connection refused"), "got: {msg}");
    }

    #[tokio::test]
    async fn test_fetch_bad_status() {
        let err = fetch(&test_client(), &url("/bad-status")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
        assert!(err.to_string().contains("bad status 404 Not Found"));
    }

    #[tokio::test]
    async fn test_fetch_non_200_success_status_is_rejected() {
        let mut created = HttpResponse::json(&ok_document());
        created.status = StatusCode::CREATED;
        let client = FakeHttpClient::new().respond(&url("/created"), created);
        let err = fetch(&client, &url("/created")).await.unwrap_err();
        assert!(err.to_string().contains("bad status 201 Created"));
    }

    #[tokio::test]
    async fn test_fetch_status_without_reason_has_no_trailing_space() {
        let status = StatusCode::from_u16(599).unwrap();
        let client = FakeHttpClient::new().respond(&url("/odd-status"), HttpResponse::new(status));
        let err = fetch(&client, &url("/odd-status")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
        assert_eq!(err.to_string(), "bad status 599");
    }

    #[tokio::test]
    async fn test_fetch_bad_content_type() {
        let err = fetch(&test_client(), &url("/bad-content-type"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedContentType);
        assert!(err.to_string().contains(r#"bad content type "text/plain""#));
    }

    #[tokio::test]
    async fn test_fetch_missing_content_type() {
        let client = FakeHttpClient::new().respond(
            &url("/no-type"),
            HttpResponse::new(StatusCode::OK).with_body(ok_document().to_string()),
        );
        let err = fetch(&client, &url("/no-type")).await.unwrap_err();
        assert!(err.to_string().contains(r#"bad content type """#));
    }

    #[tokio::test]
    async fn test_fetch_accepts_json_content_type_variants() {
        for content_type in [
            "application/json; charset=utf-8",
            "Application/JSON",
            "application/problem+json",
        ] {
            let client = FakeHttpClient::new().respond(
                &url("/ok"),
                HttpResponse::json(&ok_document())
                    .with_header(CONTENT_TYPE, HeaderValue::from_static(content_type)),
            );
            assert!(
                fetch(&client, &url("/ok")).await.is_ok(),
                "content type {content_type:?} should be accepted"
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_bad_json_surfaces_decoder_position() {
        let err = fetch(&test_client(), &url("/bad-json")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
        let msg = err.to_string();
        assert!(msg.starts_with("malformed metadata document: "), "got: {msg}");
        assert!(msg.contains("line 1 column"), "got: {msg}");
    }

    #[tokio::test]
    async fn test_fetch_missing_resource_is_malformed() {
        let client = FakeHttpClient::new().respond(
            &url("/no-resource"),
            HttpResponse::json(&serde_json::json!({"authorization_servers": []})),
        );
        let err = fetch(&client, &url("/no-resource")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
        assert!(err.to_string().contains("missing field `resource`"));
    }

    #[tokio::test]
    async fn test_fetch_mismatched_resource() {
        let err = fetch(&test_client(), &url("/mismatched-resource"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceMismatch);
        assert!(err.to_string().contains(
            r#"got metadata resource "https://wrong.example.com", want "https://resource.example.com""#
        ));
    }

    #[tokio::test]
    async fn test_fetch_resource_mismatch_reported_before_auth_server_checks() {
        let client = FakeHttpClient::new().respond(
            &url("/wrong-everything"),
            HttpResponse::json(&serde_json::json!({
                "resource": "https://wrong.example.com",
                "authorization_servers": ["javascript:alert(1)"]
            })),
        );
        let err = fetch(&client, &url("/wrong-everything"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceMismatch);
        assert!(!err.to_string().contains("javascript"), "got: {err}");
    }

    #[tokio::test]
    async fn test_fetch_resource_match_is_exact() {
        let client = FakeHttpClient::new().respond(
            &url("/trailing-slash"),
            HttpResponse::json(&serde_json::json!({"resource": "https://resource.example.com/"})),
        );
        let err = fetch(&client, &url("/trailing-slash")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceMismatch);
    }

    #[tokio::test]
    async fn test_fetch_bad_auth_server_scheme() {
        let err = fetch(&test_client(), &url("/bad-auth-server"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidAuthServerUrl);
        assert!(err
            .to_string()
            .contains(r#"URL has disallowed scheme "javascript""#));
    }

    #[tokio::test]
    async fn test_fetch_first_invalid_auth_server_is_reported() {
        let client = FakeHttpClient::new().respond(
            &url("/many"),
            HttpResponse::json(&serde_json::json!({
                "resource": WANT_RESOURCE,
                "authorization_servers": [
                    "https://as.example.com",
                    "http://plain.example.com",
                    "javascript:alert(1)"
                ]
            })),
        );
        let err = fetch(&client, &url("/many")).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(r#"URL has disallowed scheme "http""#), "got: {msg}");
        assert!(!msg.contains("javascript"), "got: {msg}");
    }

    #[tokio::test]
    async fn test_fetch_unparseable_auth_server() {
        let client = FakeHttpClient::new().respond(
            &url("/unparseable"),
            HttpResponse::json(&serde_json::json!({
                "resource": WANT_RESOURCE,
                "authorization_servers": ["not a url"]
            })),
        );
        let err = fetch(&client, &url("/unparseable")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAuthServerUrl);
        assert!(err.to_string().contains("relative URL without a base"));
    }

    #[tokio::test]
    async fn test_fetch_empty_auth_servers_is_valid() {
        let client = FakeHttpClient::new().respond(
            &url("/empty"),
            HttpResponse::json(&serde_json::json!({"resource": WANT_RESOURCE})),
        );
        let meta = fetch(&client, &url("/empty")).await.unwrap();
        assert!(meta.authorization_servers.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_cancelled_in_flight() {
        let client = test_client();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = fetch_protected_resource_metadata(&cancel, &url("/hang"), &client, WANT_RESOURCE)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert!(err.to_string().contains("request cancelled"));
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_already_cancelled_sends_nothing() {
        let client = test_client();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fetch_protected_resource_metadata(&cancel, &url("/ok"), &client, WANT_RESOURCE)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert!(client.requests().is_empty());
    }

    #[test]
    fn test_is_json_media_type() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type(" application/json ;charset=UTF-8"));
        assert!(is_json_media_type("application/vnd.api+json"));
        assert!(!is_json_media_type("text/json+html"));
        assert!(!is_json_media_type("text/plain"));
        assert!(!is_json_media_type("application/jsonx"));
        assert!(!is_json_media_type(""));
    }
}
