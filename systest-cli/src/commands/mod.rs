//! CLI command implementations.

pub mod balance;
pub mod blobbers;
pub mod config;
pub mod graph;
pub mod params;
pub mod total;
pub mod wait;

use anyhow::{Context, Result};
use serde::Serialize;
use systest_client::{HarnessConfig, HttpTransport, NetworkClient};

/// Build a client for the configured network.
pub fn connect(config: &HarnessConfig) -> Result<NetworkClient<HttpTransport>> {
    let transport = HttpTransport::new(
        config.network.service_urls(),
        config.network.request_timeout(),
    )
    .context("Failed to build HTTP client")?;
    Ok(NetworkClient::new(transport))
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
