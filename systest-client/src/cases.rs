//! Running the graph parameter cases against a live endpoint.

use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use systest_core::graph_params::{blobber_cases, standard_cases};
use systest_core::{CaseExpectation, GraphCase};
use systest_types::{BlobberGraphMetric, GraphMetric};

use crate::client::{ClientError, NetworkClient};
use crate::transport::Transport;

/// A graph endpoint under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEndpoint {
    /// Network-wide series.
    Network(GraphMetric),
    /// Challenge graph (both series must have the expected length).
    Challenges,
    /// Per-blobber series of the given blobber.
    Blobber(BlobberGraphMetric, String),
}

impl fmt::Display for GraphEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphEndpoint::Network(metric) => f.write_str(&metric.path()),
            GraphEndpoint::Challenges => f.write_str(crate::client::paths::GRAPH_CHALLENGES),
            GraphEndpoint::Blobber(metric, _) => f.write_str(&metric.path()),
        }
    }
}

impl GraphEndpoint {
    /// The case matrix that applies to this endpoint.
    pub fn cases(&self, latest_round: i64) -> Vec<GraphCase> {
        match self {
            GraphEndpoint::Blobber(..) => blobber_cases(latest_round),
            _ => standard_cases(latest_round),
        }
    }
}

/// What an endpoint actually returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// 200 with series of these lengths.
    Points {
        /// Length of each returned series.
        counts: Vec<usize>,
    },
    /// Non-2xx answer.
    Rejected {
        /// Status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Transport or decode failure.
    Error {
        /// Error message.
        message: String,
    },
}

impl CaseOutcome {
    fn from_error(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, body } => CaseOutcome::Rejected { status, body },
            other => CaseOutcome::Error {
                message: other.to_string(),
            },
        }
    }

    /// Whether this outcome satisfies `expect`.
    pub fn satisfies(&self, expect: &CaseExpectation) -> bool {
        match (expect, self) {
            (CaseExpectation::Points { count }, CaseOutcome::Points { counts }) => {
                !counts.is_empty() && counts.iter().all(|c| c == count)
            }
            (
                CaseExpectation::Rejected { status, message },
                CaseOutcome::Rejected {
                    status: actual,
                    body,
                },
            ) => status == actual && body.contains(message.as_str()),
            _ => false,
        }
    }
}

/// One executed case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// Endpoint path.
    pub endpoint: String,
    /// Case name.
    pub name: String,
    /// What was expected.
    pub expected: CaseExpectation,
    /// What happened.
    pub outcome: CaseOutcome,
    /// Whether the outcome matched.
    pub passed: bool,
}

async fn run_case<T: Transport>(
    client: &NetworkClient<T>,
    endpoint: &GraphEndpoint,
    case: &GraphCase,
) -> CaseOutcome {
    let result = match endpoint {
        GraphEndpoint::Network(metric) => client
            .graph(*metric, &case.request)
            .await
            .map(|p| vec![p.len()]),
        GraphEndpoint::Challenges => client
            .graph_challenges(&case.request)
            .await
            .map(|p| vec![p.total_challenges.len(), p.successful_challenges.len()]),
        GraphEndpoint::Blobber(metric, id) => {
            let id = if case.omit_provider { "" } else { id.as_str() };
            client
                .blobber_graph(*metric, id, &case.request)
                .await
                .map(|p| vec![p.len()])
        }
    };
    match result {
        Ok(counts) => CaseOutcome::Points { counts },
        Err(err) => CaseOutcome::from_error(err),
    }
}

/// Run every applicable case against `endpoint`.
pub async fn run_graph_cases<T: Transport>(
    client: &NetworkClient<T>,
    endpoint: &GraphEndpoint,
    latest_round: i64,
) -> Vec<CaseReport> {
    let mut reports = Vec::new();
    for case in endpoint.cases(latest_round) {
        let outcome = run_case(client, endpoint, &case).await;
        let passed = outcome.satisfies(&case.expect);
        if passed {
            debug!("{} / {}: ok", endpoint, case.name);
        } else {
            warn!(
                "{} / {}: expected {:?}, got {:?}",
                endpoint, case.name, case.expect, outcome
            );
        }
        reports.push(CaseReport {
            endpoint: endpoint.to_string(),
            name: case.name,
            expected: case.expect,
            outcome,
            passed,
        });
    }
    reports
}
