//! prm-discovery - OAuth 2.0 Protected Resource Metadata discovery CLI
//!
#![doc = "Main entry point for the prm-discovery command-line tool."]

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, WWW_AUTHENTICATE};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prm_discovery::cli::{Cli, Commands};
use prm_discovery::client::http::ReqwestHttpClient;
use prm_discovery::config::DiscoveryConfig;
use prm_discovery::{
    fetch_from_header, fetch_from_header_for_resource, fetch_from_resource_id,
    fetch_protected_resource_metadata, ProtectedResourceMetadata,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = DiscoveryConfig::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let client = ReqwestHttpClient::from_config(&config)?;

    // Ctrl-C aborts the in-flight request
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, cancelling discovery");
                cancel.cancel();
            }
        });
    }

    let metadata = match cli.command {
        Commands::Fetch { url, resource } => {
            tracing::info!("Fetching metadata from {}", url);
            Some(fetch_protected_resource_metadata(&cancel, &url, &client, &resource).await?)
        }
        Commands::Challenge { headers, resource } => {
            let mut map = HeaderMap::new();
            for value in &headers {
                let value = HeaderValue::from_str(value)
                    .with_context(|| format!("invalid WWW-Authenticate value: {value:?}"))?;
                map.append(WWW_AUTHENTICATE, value);
            }

            tracing::info!("Discovering metadata from {} challenge value(s)", headers.len());
            match resource {
                Some(resource) => {
                    fetch_from_header_for_resource(&cancel, &map, &client, &resource).await?
                }
                None => fetch_from_header(&cancel, &map, &client).await?,
            }
        }
        Commands::WellKnown { resource } => {
            tracing::info!("Discovering metadata for {}", resource);
            Some(fetch_from_resource_id(&cancel, &resource, &client).await?)
        }
    };

    match metadata {
        Some(metadata) if cli.json => {
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Some(metadata) => print_summary(&metadata),
        None => println!("No resource_metadata advertised in WWW-Authenticate"),
    }

    Ok(())
}

fn print_summary(metadata: &ProtectedResourceMetadata) {
    println!("Resource: {}", metadata.resource);
    if let Some(name) = &metadata.resource_name {
        println!("Name: {}", name);
    }
    if metadata.authorization_servers.is_empty() {
        println!("Authorization servers: (none)");
    } else {
        println!("Authorization servers:");
        for server in &metadata.authorization_servers {
            println!("  - {}", server);
        }
    }
    if let Some(scopes) = &metadata.scopes_supported {
        println!("Scopes: {}", scopes.join(" "));
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "prm_discovery=debug"
    } else {
        "prm_discovery=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
