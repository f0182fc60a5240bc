//! Poll a value until it moves as expected.

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use systest_client::{poll_immediately, HarnessConfig, HttpTransport, NetworkClient, WaitError};
use systest_core::Trend;
use systest_types::{GraphMetric, GraphRequest, TotalMetric};

use super::{connect, print_json};

/// Exit status when the value did not converge in time.
pub const EXIT_TIMEOUT: u8 = 2;

/// Expected movement, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Until(pub Trend);

impl FromStr for Until {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_n = |n: &str| {
            n.parse::<i64>()
                .map_err(|_| format!("expected an integer after '=', got '{}'", n))
        };
        match s.split_once('=') {
            None if s == "increases" => Ok(Until(Trend::Increases)),
            None if s == "decreases" => Ok(Until(Trend::Decreases)),
            Some(("changes-by", n)) => Ok(Until(Trend::ChangesBy(parse_n(n)?))),
            Some(("equals", n)) => Ok(Until(Trend::Equals(parse_n(n)?))),
            _ => Err(format!(
                "unknown condition '{}' (increases | decreases | changes-by=<n> | equals=<n>)",
                s
            )),
        }
    }
}

/// Options of one wait.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Total slug, or graph slug when `graph` is set.
    pub metric: String,
    /// Read the latest graph point instead of the total.
    pub graph: bool,
    /// Expected movement.
    pub until: Until,
    /// Budget override in seconds.
    pub timeout: Option<u64>,
    /// Interval override in milliseconds.
    pub interval: Option<u64>,
}

enum Reading {
    Total(TotalMetric),
    Graph(GraphMetric),
}

impl Reading {
    fn parse(metric: &str, graph: bool) -> Result<Self> {
        Ok(if graph {
            Reading::Graph(metric.parse().context("Unknown graph metric")?)
        } else {
            Reading::Total(metric.parse().context("Unknown total metric")?)
        })
    }

    async fn read(&self, client: &NetworkClient<HttpTransport>) -> Result<i64> {
        match self {
            Reading::Total(metric) => Ok(client.total(*metric).await?),
            Reading::Graph(metric) => {
                let points = client.graph(*metric, &GraphRequest::points(1)).await?;
                match points.latest() {
                    Some(v) => Ok(v),
                    None => bail!("{} returned no points", metric.path()),
                }
            }
        }
    }
}

/// Run the wait command.
pub async fn run(config: &HarnessConfig, opts: &WaitOptions, json: bool) -> Result<ExitCode> {
    let reading = Reading::parse(&opts.metric, opts.graph)?;
    let client = connect(config)?;

    let mut policy = config.poll.policy();
    if let Some(secs) = opts.timeout {
        policy.timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = opts.interval {
        policy = policy.with_interval(Duration::from_millis(ms));
    }

    // Same wording as a failure inside the poll.
    let baseline = reading
        .read(&client)
        .await
        .map_err(|source| anyhow::anyhow!("fatal error reading baseline: {:#}", source))?;
    let trend = opts.until.0;
    tracing::info!("{}: baseline {}, waiting until it {}", opts.metric, baseline, trend);

    let (reading, client) = (&reading, &client);
    let result = poll_immediately(policy, move |_| async move {
        let current = reading.read(client).await?;
        Ok::<_, anyhow::Error>(trend.check(baseline, current))
    })
    .await;

    match result {
        Ok(converged) => {
            if json {
                print_json(&json!({
                    "metric": opts.metric,
                    "baseline": baseline,
                    "value": converged.value,
                    "attempts": converged.attempts,
                    "elapsed_ms": converged.elapsed.as_millis() as u64,
                }))?;
            } else {
                println!(
                    "{}: {} -> {} after {} checks ({:.1}s)",
                    opts.metric,
                    baseline,
                    converged.value,
                    converged.attempts,
                    converged.elapsed.as_secs_f64()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(WaitError::Timeout {
            timeout,
            attempts,
            last_observed,
        }) => {
            if json {
                print_json(&json!({
                    "metric": opts.metric,
                    "baseline": baseline,
                    "last_observed": last_observed,
                    "attempts": attempts,
                    "timeout_secs": timeout.as_secs(),
                }))?;
            }
            eprintln!(
                "{} did not {} within {:?} ({} checks, last value {:?})",
                opts.metric, trend, timeout, attempts, last_observed
            );
            Ok(ExitCode::from(EXIT_TIMEOUT))
        }
        Err(err @ WaitError::Fatal { .. }) => Err(anyhow::anyhow!("{}", err)),
    }
}
