//! Graph query validation and the standard parameter case matrix.
//!
//! Every graph endpoint accepts the same three query parameters. The checks
//! happen in a fixed order (provider id, `from`, `to`, `data-points`, range)
//! and the first failure decides the 400 message, so the case matrix below
//! can assert on an exact substring.

use serde::{Deserialize, Serialize};
use systest_types::GraphRequest;
use thiserror::Error;

/// Number of points returned when `data-points` is omitted.
pub const DEFAULT_DATA_POINTS: u32 = 100;

/// Rejection reasons of a graph query, rendered as the network renders them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphParamError {
    /// Blobber graph called without an id.
    #[error("provider id not provided")]
    MissingProvider,

    /// `from` is not an integer.
    #[error("invalid from param")]
    InvalidFrom,

    /// `to` is not an integer.
    #[error("invalid to param")]
    InvalidTo,

    /// `data-points` is not a positive integer.
    #[error("invalid data-points query param")]
    InvalidDataPoints,

    /// The range is reversed.
    #[error("to {to} less than from {from}")]
    ReversedRange {
        /// Requested start round.
        from: i64,
        /// Requested end round.
        to: i64,
    },
}

/// A validated round range and point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphWindow {
    /// First round.
    pub from: i64,
    /// Last round.
    pub to: i64,
    /// Number of points to return.
    pub data_points: u32,
}

impl GraphWindow {
    /// Rounds sampled by each point, spread evenly over the range.
    ///
    /// The last sample is always `to`; earlier samples are clamped at `from`
    /// when the range is shorter than the point count.
    pub fn sample_rounds(&self) -> Vec<i64> {
        let n = i64::from(self.data_points);
        let span = self.to - self.from;
        (1..=n)
            .map(|i| self.from + span * i / n)
            .collect()
    }
}

fn parse_round(raw: Option<&str>, err: GraphParamError) -> Result<Option<i64>, GraphParamError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(|_| err),
    }
}

/// Validate a graph query against the latest finalized round.
///
/// Omitted `to` means the latest round and omitted `from` means the start of
/// the chain.
pub fn validate_graph_query(
    request: &GraphRequest,
    latest_round: i64,
) -> Result<GraphWindow, GraphParamError> {
    let from = parse_round(request.from.as_deref(), GraphParamError::InvalidFrom)?;
    let to = parse_round(request.to.as_deref(), GraphParamError::InvalidTo)?;

    let data_points = match request.data_points.as_deref() {
        None | Some("") => DEFAULT_DATA_POINTS,
        Some(s) => match s.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(GraphParamError::InvalidDataPoints),
        },
    };

    let to = to.unwrap_or(latest_round);
    let from = from.unwrap_or(0);
    if to < from {
        return Err(GraphParamError::ReversedRange { from, to });
    }

    Ok(GraphWindow {
        from,
        to,
        data_points,
    })
}

/// Validate a blobber graph query. The id is checked before anything else.
pub fn validate_blobber_graph_query(
    blobber_id: &str,
    request: &GraphRequest,
    latest_round: i64,
) -> Result<GraphWindow, GraphParamError> {
    if blobber_id.is_empty() {
        return Err(GraphParamError::MissingProvider);
    }
    validate_graph_query(request, latest_round)
}

/// What a case expects back from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseExpectation {
    /// HTTP error whose body contains `message`.
    Rejected {
        /// Expected status code.
        status: u16,
        /// Substring of the response body.
        message: String,
    },
    /// 200 with exactly `count` points.
    Points {
        /// Expected number of points.
        count: usize,
    },
}

impl CaseExpectation {
    fn rejected(err: GraphParamError) -> Self {
        Self::Rejected {
            status: 400,
            message: err.to_string(),
        }
    }
}

/// One parameter-validation case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCase {
    /// Short description for reports.
    pub name: String,
    /// Query to send.
    pub request: GraphRequest,
    /// Send an empty provider id (blobber graphs only).
    pub omit_provider: bool,
    /// Expected outcome.
    pub expect: CaseExpectation,
}

impl GraphCase {
    fn new(name: &str, request: GraphRequest, expect: CaseExpectation) -> Self {
        Self {
            name: name.to_string(),
            request,
            omit_provider: false,
            expect,
        }
    }
}

fn invalid_param_cases() -> Vec<GraphCase> {
    vec![
        GraphCase::new(
            "invalid from",
            GraphRequest::raw("AX", "20", "5"),
            CaseExpectation::rejected(GraphParamError::InvalidFrom),
        ),
        GraphCase::new(
            "invalid to",
            GraphRequest::raw("10", "AX", "5"),
            CaseExpectation::rejected(GraphParamError::InvalidTo),
        ),
        GraphCase::new(
            "invalid data points",
            GraphRequest::raw("10", "20", "AX"),
            CaseExpectation::rejected(GraphParamError::InvalidDataPoints),
        ),
    ]
}

fn reversed_range_case() -> GraphCase {
    GraphCase::new(
        "reversed range",
        GraphRequest::range(10_000, 1_000, 10),
        CaseExpectation::rejected(GraphParamError::ReversedRange {
            from: 10_000,
            to: 1_000,
        }),
    )
}

fn tail_cases(latest_round: i64) -> Vec<GraphCase> {
    vec![
        GraphCase::new(
            "single point",
            GraphRequest::points(1),
            CaseExpectation::Points { count: 1 },
        ),
        GraphCase::new(
            "latest twenty rounds",
            GraphRequest::range(latest_round - 20, latest_round, 10),
            CaseExpectation::Points { count: 10 },
        ),
    ]
}

/// Cases every network-wide graph endpoint must pass.
pub fn standard_cases(latest_round: i64) -> Vec<GraphCase> {
    let mut cases = invalid_param_cases();
    cases.push(GraphCase::new(
        "fixed range",
        GraphRequest::range(1_000, 1_010, 10),
        CaseExpectation::Points { count: 10 },
    ));
    cases.push(reversed_range_case());
    cases.extend(tail_cases(latest_round));
    cases
}

/// Cases every blobber graph endpoint must pass.
pub fn blobber_cases(latest_round: i64) -> Vec<GraphCase> {
    let mut missing = GraphCase::new(
        "missing provider id",
        GraphRequest::raw("AX", "20", "5"),
        CaseExpectation::rejected(GraphParamError::MissingProvider),
    );
    missing.omit_provider = true;

    let mut cases = vec![missing];
    cases.extend(invalid_param_cases());
    cases.push(reversed_range_case());
    cases.extend(tail_cases(latest_round));
    cases
}
