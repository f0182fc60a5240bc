//! Run the parameter validation cases against graph endpoints.

use anyhow::{Context, Result};
use std::process::ExitCode;

use systest_client::{run_graph_cases, CaseReport, GraphEndpoint, HarnessConfig};
use systest_types::{BlobberGraphMetric, GraphMetric};

use super::{connect, print_json};

/// Endpoints selected by the command-line arguments.
pub fn endpoints(metrics: &[String], blobber: Option<&str>) -> Result<Vec<GraphEndpoint>> {
    let mut endpoints = Vec::new();
    if metrics.is_empty() {
        endpoints.extend(GraphMetric::ALL.iter().copied().map(GraphEndpoint::Network));
        endpoints.push(GraphEndpoint::Challenges);
    } else {
        for m in metrics {
            if m == "challenges" {
                endpoints.push(GraphEndpoint::Challenges);
            } else {
                let metric: GraphMetric = m.parse().context("Unknown graph metric")?;
                endpoints.push(GraphEndpoint::Network(metric));
            }
        }
    }

    if let Some(id) = blobber {
        endpoints.extend(
            BlobberGraphMetric::ALL
                .iter()
                .map(|m| GraphEndpoint::Blobber(*m, id.to_string())),
        );
    }
    Ok(endpoints)
}

/// Run the check-params command.
pub async fn run(
    config: &HarnessConfig,
    metrics: &[String],
    blobber: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    let endpoints = endpoints(metrics, blobber)?;
    let client = connect(config)?;
    let latest_round = client
        .latest_round()
        .await
        .context("Failed to read latest round")?;

    let mut reports: Vec<CaseReport> = Vec::new();
    for endpoint in &endpoints {
        reports.extend(run_graph_cases(&client, endpoint, latest_round).await);
    }

    let failed = reports.iter().filter(|r| !r.passed).count();
    if json {
        print_json(&reports)?;
    } else {
        for r in &reports {
            let mark = if r.passed { "ok  " } else { "FAIL" };
            println!("{} {} / {}", mark, r.endpoint, r.name);
            if !r.passed {
                println!("       expected {:?}", r.expected);
                println!("       got      {:?}", r.outcome);
            }
        }
        println!();
        println!(
            "{} cases, {} failed (latest round {})",
            reports.len(),
            failed,
            latest_round
        );
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
