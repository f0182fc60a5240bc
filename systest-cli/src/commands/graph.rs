//! Print graph series.

use anyhow::{Context, Result};
use clap::Args;

use systest_client::HarnessConfig;
use systest_types::{BlobberGraphMetric, GraphMetric, GraphRequest};

use super::{connect, print_json};

/// Round range and point count, passed through unvalidated.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start round
    #[arg(long)]
    pub from: Option<String>,

    /// End round
    #[arg(long)]
    pub to: Option<String>,

    /// Number of points
    #[arg(long)]
    pub points: Option<String>,
}

impl RangeArgs {
    /// Graph request with the given parameters.
    pub fn request(&self) -> GraphRequest {
        GraphRequest {
            from: self.from.clone(),
            to: self.to.clone(),
            data_points: self.points.clone(),
        }
    }
}

fn print_series(name: &str, values: &[i64], json: bool) -> Result<()> {
    if json {
        return print_json(&values);
    }
    println!("{} ({} points)", name, values.len());
    for (i, v) in values.iter().enumerate() {
        println!("  [{:>3}] {}", i, v);
    }
    Ok(())
}

/// Run the graph command.
pub async fn run(
    config: &HarnessConfig,
    metric: &str,
    range: &RangeArgs,
    json: bool,
) -> Result<()> {
    let client = connect(config)?;
    let request = range.request();

    if metric == "challenges" {
        let points = client.graph_challenges(&request).await?;
        if json {
            return print_json(&points);
        }
        print_series("total challenges", &points.total_challenges, false)?;
        return print_series("successful challenges", &points.successful_challenges, false);
    }

    let metric: GraphMetric = metric.parse().context("Unknown graph metric")?;
    let points = client.graph(metric, &request).await?;
    print_series(metric.slug(), points.values(), json)
}

/// Run the blobber-graph command.
pub async fn run_blobber(
    config: &HarnessConfig,
    metric: &str,
    id: &str,
    range: &RangeArgs,
    json: bool,
) -> Result<()> {
    let metric: BlobberGraphMetric = metric.parse().context("Unknown blobber graph metric")?;
    let client = connect(config)?;
    let points = client.blobber_graph(metric, id, &range.request()).await?;
    print_series(metric.slug(), points.values(), json)
}
