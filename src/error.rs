//! Error types for protected resource metadata discovery
//!
//! Every failure of the fetch-and-validate pipeline is classified into one
//! [`DiscoveryError`] variant. Each variant embeds the offending value in its
//! message so callers (and tests) can match on substrings as well as on
//! [`DiscoveryError::kind`].

use thiserror::Error;

/// Classification of a [`DiscoveryError`], suitable for `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The metadata URL does not use HTTPS.
    InsecureTransport,
    /// Network, DNS, TLS or cancellation failure during the GET.
    TransportFailure,
    /// The response status was not `200 OK`.
    UnexpectedStatus,
    /// The response was not JSON-typed.
    UnexpectedContentType,
    /// The response body failed to decode.
    MalformedDocument,
    /// The decoded `resource` differs from the expected identifier.
    ResourceMismatch,
    /// An `authorization_servers` entry is unparseable or not HTTPS.
    InvalidAuthServerUrl,
    /// Configuration could not be loaded or failed validation.
    Config,
}

/// Main error type for metadata discovery.
///
/// Variants are terminal for the current fetch attempt; nothing in this
/// crate retries on any of them.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The metadata URL is not an `https` URL.
    #[error("resource URL {url:?} does not use HTTPS")]
    InsecureTransport {
        /// The rejected URL, verbatim.
        url: String,
    },

    /// The GET could not be completed.
    #[error("GET {url:?}: {message}")]
    TransportFailure {
        /// The URL being fetched.
        url: String,
        /// The underlying transport diagnostic.
        message: String,
    },

    /// The server answered with something other than `200 OK`.
    #[error("bad status {status}{}", reason_suffix(.reason))]
    UnexpectedStatus {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase, if the code has one.
        reason: Option<String>,
    },

    /// The `Content-Type` header is missing or not a JSON media type.
    #[error("bad content type {content_type:?}")]
    UnexpectedContentType {
        /// The received header value, verbatim.
        content_type: String,
    },

    /// The body is not a valid metadata JSON object.
    #[error("malformed metadata document: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    /// The document describes a different resource.
    #[error("got metadata resource {got:?}, want {want:?}")]
    ResourceMismatch {
        /// The `resource` member from the document.
        got: String,
        /// The identifier the caller expected.
        want: String,
    },

    /// An authorization server entry failed URL validation.
    #[error("authorization server URL {url:?}: {reason}")]
    InvalidAuthServerUrl {
        /// The offending entry, verbatim.
        url: String,
        /// Either a disallowed-scheme message or the URL parse error.
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiscoveryError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsecureTransport { .. } => ErrorKind::InsecureTransport,
            Self::TransportFailure { .. } => ErrorKind::TransportFailure,
            Self::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
            Self::UnexpectedContentType { .. } => ErrorKind::UnexpectedContentType,
            Self::MalformedDocument(_) => ErrorKind::MalformedDocument,
            Self::ResourceMismatch { .. } => ErrorKind::ResourceMismatch,
            Self::InvalidAuthServerUrl { .. } => ErrorKind::InvalidAuthServerUrl,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(" {reason}"))
        .unwrap_or_default()
}
