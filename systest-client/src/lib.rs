//! # systest-client
//!
//! I/O side of the storage network system tests.
//!
//! This is the library scenarios use to observe and drive the network.
//!
//! ## Features
//!
//! - **Typed Reads**: graphs, totals and smart contract state via [`NetworkClient`]
//! - **Convergence Polling**: [`poll_immediately`] interprets the pure
//!   decisions of systest-core with a real clock
//! - **Chain Operations**: write-side actions behind [`ChainOps`], driven by
//!   the wallet and storage CLIs in [`CliOps`]
//! - **Transport Abstraction**: pluggable transport layer (HTTP, mock)
//!
//! ## Example
//!
//! ```ignore
//! use systest_client::{poll_immediately, ClientError, HarnessConfig, HttpTransport, NetworkClient};
//! use systest_core::Check;
//! use systest_types::TotalMetric;
//!
//! let config = HarnessConfig::load(None)?;
//! let transport = HttpTransport::new(
//!     config.network.service_urls(),
//!     config.network.request_timeout(),
//! )?;
//! let client = NetworkClient::new(transport);
//!
//! let baseline = client.total(TotalMetric::TotalStaked).await?;
//! let staked = poll_immediately(config.poll.policy(), |_| async {
//!     let now = client.total(TotalMetric::TotalStaked).await?;
//!     Ok::<_, ClientError>(Check::when(now > baseline, now))
//! })
//! .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cases;
pub mod cli;
pub mod client;
pub mod config;
pub mod ops;
pub mod transport;
pub mod wait;

pub use cases::{run_graph_cases, CaseOutcome, CaseReport, GraphEndpoint};
pub use cli::{CliOps, Program};
pub use client::{ClientError, NetworkClient};
pub use config::{ConfigError, HarnessConfig};
pub use ops::{AllocationRequest, AllocationUpdate, BlobberUpdate, ChainOps, OpsError};
pub use transport::{
    HttpTransport, MockTransport, RawResponse, Service, ServiceUrls, Transport, TransportError,
};
pub use wait::{converged_within, poll_immediately, Converged, WaitError};
