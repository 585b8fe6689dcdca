//! Discovery entry points for Protected Resource Metadata (RFC 9728)
//!
//! # Discovery sequence
//!
//! 1. The client issues an unauthenticated request to the resource server.
//! 2. The server responds with `401 Unauthorized` and a `WWW-Authenticate`
//!    header that may contain a `resource_metadata` parameter pointing to the
//!    metadata document.
//! 3. [`fetch_from_header`] extracts that URL and hands it to
//!    [`fetch_protected_resource_metadata`]. When the header offers nothing,
//!    the result is `Ok(None)`: no discovery information, which is not an
//!    error.
//! 4. A caller that already knows the resource identifier can instead use
//!    [`fetch_from_resource_id`], which builds the RFC 9728 well-known URI.
//!
//! Callers must branch on three outcomes for header discovery: `Ok(None)`,
//! `Ok(Some(metadata))` and `Err(_)`.

use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::challenge::resource_metadata_url;
use crate::client::HttpClient;
use crate::error::Result;
use crate::fetch::{fetch_protected_resource_metadata, require_https};
use crate::metadata::ProtectedResourceMetadata;

/// Path segment inserted by RFC 9728 §3.1.
pub const WELL_KNOWN_PROTECTED_RESOURCE: &str = "/.well-known/oauth-protected-resource";

/// Discovers metadata from a response's `WWW-Authenticate` headers.
///
/// The URL named by the first `Bearer` challenge's `resource_metadata`
/// parameter is fetched and validated, with that same URL as the expected
/// `resource`.
///
/// # Returns
///
/// - `Ok(None)` when the header is absent, empty, or has no
///   `resource_metadata` parameter on a `Bearer` challenge.
/// - `Ok(Some(metadata))` when discovery succeeded.
///
/// # Errors
///
/// Returns whatever [`fetch_protected_resource_metadata`] returns for the
/// advertised URL, unchanged.
///
/// # Examples
///
/// ```
/// use prm_discovery::client::fake::FakeHttpClient;
/// use prm_discovery::discovery::fetch_from_header;
/// use reqwest::header::{HeaderMap, HeaderValue, WWW_AUTHENTICATE};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut headers = HeaderMap::new();
/// headers.insert(WWW_AUTHENTICATE, HeaderValue::from_static(r#"Bearer realm="example.com""#));
///
/// let outcome = fetch_from_header(&CancellationToken::new(), &headers, &FakeHttpClient::new())
///     .await
///     .unwrap();
/// assert!(outcome.is_none());
/// # }
/// ```
pub async fn fetch_from_header(
    cancel: &CancellationToken,
    headers: &HeaderMap,
    client: &dyn HttpClient,
) -> Result<Option<ProtectedResourceMetadata>> {
    let Some(metadata_url) = resource_metadata_url(headers) else {
        tracing::debug!("No resource_metadata challenge in WWW-Authenticate");
        return Ok(None);
    };

    fetch_protected_resource_metadata(cancel, &metadata_url, client, &metadata_url)
        .await
        .map(Some)
}

/// Like [`fetch_from_header`], but validates `resource` against a
/// caller-supplied identifier, typically the URL originally requested.
///
/// # Errors
///
/// Returns whatever [`fetch_protected_resource_metadata`] returns for the
/// advertised URL, unchanged.
pub async fn fetch_from_header_for_resource(
    cancel: &CancellationToken,
    headers: &HeaderMap,
    client: &dyn HttpClient,
    expected_resource: &str,
) -> Result<Option<ProtectedResourceMetadata>> {
    let Some(metadata_url) = resource_metadata_url(headers) else {
        tracing::debug!("No resource_metadata challenge in WWW-Authenticate");
        return Ok(None);
    };

    fetch_protected_resource_metadata(cancel, &metadata_url, client, expected_resource)
        .await
        .map(Some)
}

/// Builds the RFC 9728 well-known metadata URL for a resource identifier.
///
/// The well-known segment is inserted between the host and the path. A root
/// path contributes nothing, the query is kept and the fragment dropped.
///
/// # Errors
///
/// Returns [`DiscoveryError::InsecureTransport`](crate::error::DiscoveryError::InsecureTransport)
/// if `resource_id` is not an `https` URL.
///
/// # Examples
///
/// ```
/// use prm_discovery::discovery::well_known_metadata_url;
///
/// let url = well_known_metadata_url("https://rs.example.com/api/v2").unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://rs.example.com/.well-known/oauth-protected-resource/api/v2"
/// );
/// ```
pub fn well_known_metadata_url(resource_id: &str) -> Result<Url> {
    let resource = require_https(resource_id)?;

    let path = match resource.path() {
        "/" | "" => String::new(),
        other => other.to_string(),
    };

    let mut url = resource;
    url.set_path(&format!("{WELL_KNOWN_PROTECTED_RESOURCE}{path}"));
    url.set_fragment(None);
    Ok(url)
}

/// Discovers metadata for a known resource identifier via its well-known
/// URI. The document must declare `resource_id` as its `resource`.
///
/// # Errors
///
/// Returns [`DiscoveryError::InsecureTransport`](crate::error::DiscoveryError::InsecureTransport)
/// for a non-HTTPS identifier, otherwise whatever
/// [`fetch_protected_resource_metadata`] returns.
pub async fn fetch_from_resource_id(
    cancel: &CancellationToken,
    resource_id: &str,
    client: &dyn HttpClient,
) -> Result<ProtectedResourceMetadata> {
    let metadata_url = well_known_metadata_url(resource_id)?;
    tracing::debug!(%metadata_url, resource_id, "Using well-known metadata URL");

    fetch_protected_resource_metadata(cancel, metadata_url.as_str(), client, resource_id).await
}
