//! Command-line interface definition for prm-discovery
//!
//! This module defines the CLI structure using clap's derive API. Each
//! subcommand maps onto one discovery entry point of the library.

use clap::{Parser, Subcommand};

/// prm-discovery - OAuth 2.0 Protected Resource Metadata discovery
///
/// Fetch and validate RFC 9728 metadata for a protected resource, either from
/// an explicit metadata URL, a `WWW-Authenticate` challenge, or the
/// well-known URI of a resource identifier.
#[derive(Parser, Debug, Clone)]
#[command(name = "prm-discovery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the validated metadata as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Override the HTTP request timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for prm-discovery
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch metadata from an explicit metadata URL
    Fetch {
        /// HTTPS URL of the metadata document
        #[arg(short, long)]
        url: String,

        /// Resource identifier the document must declare
        #[arg(short, long)]
        resource: String,
    },

    /// Discover metadata from a WWW-Authenticate header value
    Challenge {
        /// Raw `WWW-Authenticate` header value (may be repeated)
        #[arg(long = "header", required = true)]
        headers: Vec<String>,

        /// Resource identifier the document must declare; defaults to the
        /// metadata URL named in the challenge
        #[arg(short, long)]
        resource: Option<String>,
    },

    /// Discover metadata from the RFC 9728 well-known URI of a resource
    WellKnown {
        /// HTTPS resource identifier
        #[arg(short, long)]
        resource: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
