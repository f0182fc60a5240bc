//! Print a total.

use anyhow::{Context, Result};
use serde_json::json;

use systest_client::HarnessConfig;
use systest_types::TotalMetric;

use super::{connect, print_json};

/// Run the total command.
pub async fn run(config: &HarnessConfig, metric: &str, json: bool) -> Result<()> {
    let metric: TotalMetric = metric.parse().context("Unknown total metric")?;
    let value = connect(config)?.total(metric).await?;
    if json {
        print_json(&json!({ "metric": metric.slug(), "value": value }))
    } else {
        println!("{}: {}", metric.slug(), value);
        Ok(())
    }
}
