//! prm-discovery - OAuth 2.0 Protected Resource Metadata discovery
//!
//! This library locates and validates RFC 9728 Protected Resource Metadata
//! for a resource server. A client that receives `401 Unauthorized` uses it
//! to find the authorization servers able to issue tokens for the resource.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `challenge`: `WWW-Authenticate` parsing and `resource_metadata` extraction
//! - `fetch`: the secure fetch-and-validate pipeline
//! - `discovery`: header-driven and well-known discovery entry points
//! - `client`: the injected HTTP client trait and its implementations
//! - `metadata`: the metadata document type
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use prm_discovery::client::http::ReqwestHttpClient;
//! use prm_discovery::fetch_from_header;
//! use reqwest::header::WWW_AUTHENTICATE;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = reqwest::Client::new();
//!     let response = http.get("https://api.example.com/mcp").send().await?;
//!
//!     let client = ReqwestHttpClient::new(http);
//!     match fetch_from_header(&CancellationToken::new(), response.headers(), &client).await? {
//!         Some(meta) => println!("authorization servers: {:?}", meta.authorization_servers),
//!         None => println!("no metadata advertised in {}", WWW_AUTHENTICATE),
//!     }
//!     Ok(())
//! }
//! ```

pub mod challenge;
pub mod cli;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod metadata;

// Re-export commonly used types
pub use client::{HttpClient, HttpResponse};
pub use config::DiscoveryConfig;
pub use discovery::{
    fetch_from_header, fetch_from_header_for_resource, fetch_from_resource_id,
    well_known_metadata_url,
};
pub use error::{DiscoveryError, ErrorKind, Result};
pub use fetch::fetch_protected_resource_metadata;
pub use metadata::ProtectedResourceMetadata;
