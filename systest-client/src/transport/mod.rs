//! Transport abstraction for the network read APIs.
//!
//! This module provides a pluggable transport layer that abstracts how a
//! request reaches a service (real HTTP, mock for testing).
//!
//! # Design
//!
//! The transport trait is a single async `get`:
//! - the [`Service`] picks the base URL (sharder, miner, aggregate API)
//! - `path` and `query` are appended as-is
//! - the response is returned raw, whatever its status
//!
//! Status interpretation and JSON decoding happen in
//! [`NetworkClient`](crate::NetworkClient), so tests can assert on error
//! bodies the network returns.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.set_json(Service::Miner, "/v1/miner/get/stats", &stats);
//! let resp = transport.get(Service::Miner, "/v1/miner/get/stats", &[]).await?;
//! assert_eq!(resp.status, 200);
//! ```

mod http;
mod mock;

pub use http::{HttpTransport, ServiceUrls};
pub use mock::{MockTransport, RecordedRequest};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timeout")]
    Timeout,

    /// Request failed for another reason.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Service base URL could not be used.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Services the harness reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Sharder REST API (smart contract state, balances).
    Sharder,
    /// Miner API (chain stats).
    Miner,
    /// Aggregate API (graphs and totals).
    Zbox,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Service::Sharder => "sharder",
            Service::Miner => "miner",
            Service::Zbox => "zbox",
        })
    }
}

/// A response as received, before status interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// Response with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for the read-only network APIs.
///
/// Implementations handle the underlying mechanism (HTTP, mock, etc).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET against `service`.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn get(
        &self,
        service: Service,
        path: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, TransportError>;
}
