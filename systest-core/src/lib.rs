//! # systest-core
//!
//! Pure logic for the storage network system tests (no I/O, instant tests).
//!
//! This crate implements the decisions and calculations the harness makes
//! without any network, process or clock access, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects:
//! - [`poll`] decides whether a pending convergence check retries or expires
//! - [`expected`] derives aggregate values from blobber lists
//! - [`graph_params`] holds graph query validation and the standard case matrix
//! - [`divergence`] documents known inconsistencies of the network under test
//!
//! The actual I/O (HTTP, sleeping, spawning CLIs) is performed by
//! `systest-client`, which interprets the decisions made here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod divergence;
pub mod expected;
pub mod graph_params;
pub mod poll;

pub use divergence::{DivergenceOutcome, KnownDivergence};
pub use expected::GB;
pub use graph_params::{CaseExpectation, GraphCase, GraphParamError, GraphWindow};
pub use poll::{
    Check, PollAttempt, PollPolicy, Step, Trend, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT,
};
