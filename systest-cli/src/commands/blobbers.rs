//! Compare the latest totals with values recomputed from the blobber list.

use anyhow::{Context, Result};
use serde::Serialize;
use std::process::ExitCode;

use systest_client::HarnessConfig;
use systest_core::expected::{
    expected_allocated, expected_avg_write_price, expected_saved_data, total_capacity,
    WRITE_PRICE_TOLERANCE,
};
use systest_types::{Blobber, TotalMetric};

use super::{connect, print_json};

/// One total compared with its recomputed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    /// Total slug.
    pub metric: &'static str,
    /// Recomputed from the blobber list.
    pub expected: i64,
    /// Reported by the endpoint.
    pub actual: i64,
    /// Accepted difference.
    pub tolerance: i64,
}

impl Comparison {
    /// Whether the reported value is close enough.
    pub fn matches(&self) -> bool {
        systest_core::expected::within_tolerance(self.expected, self.actual, self.tolerance)
    }
}

/// Totals that can be recomputed, with their expected value and tolerance.
pub fn expectations(blobbers: &[Blobber]) -> Vec<(TotalMetric, i64, i64)> {
    vec![
        (
            TotalMetric::AverageWritePrice,
            expected_avg_write_price(blobbers),
            WRITE_PRICE_TOLERANCE,
        ),
        (
            TotalMetric::TotalAllocatedStorage,
            expected_allocated(blobbers),
            0,
        ),
        (TotalMetric::TotalStoredData, expected_saved_data(blobbers), 0),
        (TotalMetric::TotalBlobberCapacity, total_capacity(blobbers), 0),
    ]
}

/// Run the blobbers command.
pub async fn run(config: &HarnessConfig, json: bool) -> Result<ExitCode> {
    let client = connect(config)?;
    let blobbers = client
        .all_blobbers()
        .await
        .context("Failed to list blobbers")?;

    let mut comparisons = Vec::new();
    for (metric, expected, tolerance) in expectations(&blobbers) {
        let actual = client.total(metric).await?;
        comparisons.push(Comparison {
            metric: metric.slug(),
            expected,
            actual,
            tolerance,
        });
    }

    let mismatches = comparisons.iter().filter(|c| !c.matches()).count();
    if json {
        print_json(&comparisons)?;
    } else {
        println!("{} blobbers", blobbers.len());
        for c in &comparisons {
            let mark = if c.matches() { "ok  " } else { "DIFF" };
            println!(
                "{} {:<24} expected {:>20} actual {:>20}",
                mark, c.metric, c.expected, c.actual
            );
        }
    }

    Ok(if mismatches == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
