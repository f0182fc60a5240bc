//! # systest
//!
//! Command-line companion of the storage network system tests.
//!
//! ## Commands
//!
//! - `graph`: Print a network-wide graph series
//! - `blobber-graph`: Print a per-blobber graph series
//! - `total`: Print the latest value of a total
//! - `wait`: Poll a total until it moves as expected
//! - `check-params`: Run the parameter validation cases against graph endpoints
//! - `blobbers`: Compare latest totals with values recomputed from the blobber list
//! - `balance`: Print a wallet balance
//! - `config`: Write or show the configuration
//!
//! ## Example
//!
//! ```bash
//! # Latest point of the total-staked graph
//! systest graph total-staked --points 1
//!
//! # Wait up to two minutes for a stake to land
//! systest wait total-staked --until changes-by=10000000000
//!
//! # Check every graph endpoint rejects bad parameters
//! systest check-params --blobber 2a4d5a5c...
//! ```
//!
//! `wait` exits with status 2 when the value does not converge in time and
//! with status 1 on any other error.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{balance, blobbers, config, graph, params, total, wait};
use systest_client::HarnessConfig;

/// Command-line companion of the storage network system tests.
#[derive(Parser, Debug)]
#[command(name = "systest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: $SYSTEST_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a network-wide graph series
    Graph {
        /// Metric slug (e.g. total-staked, or "challenges")
        metric: String,

        #[command(flatten)]
        range: graph::RangeArgs,
    },

    /// Print a per-blobber graph series
    BlobberGraph {
        /// Metric slug (e.g. capacity)
        metric: String,

        /// Blobber id
        #[arg(long)]
        id: String,

        #[command(flatten)]
        range: graph::RangeArgs,
    },

    /// Print the latest value of a total
    Total {
        /// Metric slug (e.g. total-staked)
        metric: String,
    },

    /// Poll a value until it moves as expected
    Wait {
        /// Total slug, or graph slug with --graph
        metric: String,

        /// Read the latest point of the graph instead of the total
        #[arg(long)]
        graph: bool,

        /// increases | decreases | changes-by=<n> | equals=<n>
        #[arg(long)]
        until: wait::Until,

        /// Budget in seconds (default: from config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Delay between checks in milliseconds (default: from config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Run the parameter validation cases against graph endpoints
    CheckParams {
        /// Graph slugs to check (default: all, plus the challenge graph)
        #[arg(long = "metric")]
        metrics: Vec<String>,

        /// Also check every blobber graph with this blobber id
        #[arg(long)]
        blobber: Option<String>,
    },

    /// Compare latest totals with values recomputed from the blobber list
    Blobbers,

    /// Print a wallet balance
    Balance {
        /// Wallet client id
        client_id: String,
    },

    /// Write or show the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a config file with every default filled in
    Init {
        /// Destination (default: the platform config dir)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone();
    let load = || HarnessConfig::load(config_path.as_deref()).context("Failed to load config");

    match cli.command {
        Commands::Graph { metric, range } => {
            graph::run(&load()?, &metric, &range, cli.json).await?;
        }
        Commands::BlobberGraph { metric, id, range } => {
            graph::run_blobber(&load()?, &metric, &id, &range, cli.json).await?;
        }
        Commands::Total { metric } => {
            total::run(&load()?, &metric, cli.json).await?;
        }
        Commands::Wait {
            metric,
            graph,
            until,
            timeout,
            interval,
        } => {
            let opts = wait::WaitOptions {
                metric,
                graph,
                until,
                timeout,
                interval,
            };
            return wait::run(&load()?, &opts, cli.json).await;
        }
        Commands::CheckParams { metrics, blobber } => {
            return params::run(&load()?, &metrics, blobber.as_deref(), cli.json).await;
        }
        Commands::Blobbers => {
            return blobbers::run(&load()?, cli.json).await;
        }
        Commands::Balance { client_id } => {
            balance::run(&load()?, &client_id, cli.json).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => config::init(path.as_deref(), force)?,
            ConfigAction::Show => config::show(&load()?)?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
