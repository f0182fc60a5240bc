//! # systest-types
//!
//! Models of the storage network APIs exercised by the system tests.
//!
//! This crate provides the foundational types used across all systest crates:
//! - [`BlobberId`], [`AllocationId`], [`ClientId`] - Identity types
//! - [`Blobber`], [`Allocation`], [`WalletBalance`], ... - REST response models
//! - [`GraphRequest`], [`GraphPoints`], [`GraphMetric`] - Aggregate graph API
//! - [`tokens`] - ZCN / base-unit conversions
//! - [`SystestError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod graph;
mod ids;
mod model;
pub mod tokens;

pub use error::SystestError;
pub use graph::{
    BlobberGraphMetric, ChallengePoints, GraphMetric, GraphPoints, GraphRequest, TotalMetric,
};
pub use ids::{AllocationId, BlobberId, ClientId};
pub use model::{
    Allocation, AllocationBlobber, Blobber, BlobberTerms, DelegatePool, MinerStats, NodeSummary,
    ProviderType, StakePoolSettings, StakePoolStat, UserStakePoolStat, Validator, WalletBalance,
    WritePoolBlobber, WritePoolInfo,
};
