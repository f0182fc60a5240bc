//! Write-side chain operations.
//!
//! Anything that changes chain state needs a signed transaction, which the
//! harness does not build itself. Scenarios reach those actions through
//! [`ChainOps`]; [`CliOps`](crate::CliOps) implements it by driving the
//! wallet and storage CLIs.
//!
//! Wallets are referred to by name. Amounts are in base units.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use systest_types::{AllocationId, BlobberId, ProviderType, SystestError, WritePoolInfo};

/// Errors from chain operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// The command could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program path.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The command exited with a failure status.
    #[error("`{command}` failed (exit {exit_code}): {}", .output.join("\n"))]
    CommandFailed {
        /// Command line that was run.
        command: String,
        /// Exit code, -1 if killed by a signal.
        exit_code: i32,
        /// Output lines.
        output: Vec<String>,
    },

    /// The command succeeded but printed something unexpected.
    #[error("unexpected output from `{command}`: {}", .output.join("\n"))]
    UnexpectedOutput {
        /// Command line that was run.
        command: String,
        /// Output lines.
        output: Vec<String>,
    },

    /// Output could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] SystestError),

    /// JSON output could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The operation does not apply to this provider type.
    #[error("unsupported provider type: {0:?}")]
    UnsupportedProvider(ProviderType),
}

impl OpsError {
    /// Output lines of a failed or unexpected command.
    pub fn output(&self) -> &[String] {
        match self {
            OpsError::CommandFailed { output, .. } | OpsError::UnexpectedOutput { output, .. } => {
                output
            }
            _ => &[],
        }
    }
}

/// Parameters of a new allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRequest {
    /// Size in bytes.
    pub size: i64,
    /// Data shards.
    pub data_shards: u32,
    /// Parity shards.
    pub parity_shards: u32,
    /// Lifetime, e.g. "5m".
    pub expire: String,
    /// Tokens locked in the allocation's write pool, base units.
    pub lock: i64,
}

impl Default for AllocationRequest {
    fn default() -> Self {
        Self {
            size: 10_000,
            data_shards: 1,
            parity_shards: 1,
            expire: "1h".to_string(),
            lock: systest_types::tokens::ZCN / 2,
        }
    }
}

/// Changes to an existing allocation. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationUpdate {
    /// New size in bytes.
    pub size: Option<i64>,
    /// Extend lifetime by, e.g. "1h".
    pub extend: Option<String>,
    /// Additional tokens to lock, base units.
    pub lock: Option<i64>,
}

/// Changes to a blobber's settings. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobberUpdate {
    /// Capacity in bytes.
    pub capacity: Option<i64>,
    /// Write price, base units.
    pub write_price: Option<i64>,
    /// Read price, base units.
    pub read_price: Option<i64>,
}

/// Write-side operations against the chain.
#[async_trait]
pub trait ChainOps: Send + Sync {
    /// Create a wallet.
    async fn register_wallet(&self, wallet: &str) -> Result<(), OpsError>;

    /// Mint test tokens into a wallet.
    async fn faucet(&self, wallet: &str, amount: i64) -> Result<(), OpsError>;

    /// Wallet balance, base units.
    async fn balance(&self, wallet: &str) -> Result<i64, OpsError>;

    /// Create an allocation.
    async fn create_allocation(
        &self,
        wallet: &str,
        request: &AllocationRequest,
    ) -> Result<AllocationId, OpsError>;

    /// Update an allocation.
    async fn update_allocation(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        update: &AllocationUpdate,
    ) -> Result<(), OpsError>;

    /// Add a blobber to an allocation.
    async fn add_blobber(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        blobber: &BlobberId,
    ) -> Result<(), OpsError>;

    /// Cancel an allocation.
    async fn cancel_allocation(
        &self,
        wallet: &str,
        allocation: &AllocationId,
    ) -> Result<(), OpsError>;

    /// Update a blobber's settings.
    async fn update_blobber(
        &self,
        wallet: &str,
        blobber: &BlobberId,
        update: &BlobberUpdate,
    ) -> Result<(), OpsError>;

    /// Stake tokens with a provider.
    async fn stake(
        &self,
        wallet: &str,
        provider_type: ProviderType,
        provider_id: &str,
        amount: i64,
    ) -> Result<(), OpsError>;

    /// Unstake everything from a provider.
    async fn unstake(
        &self,
        wallet: &str,
        provider_type: ProviderType,
        provider_id: &str,
    ) -> Result<(), OpsError>;

    /// Lock tokens in an allocation's write pool.
    async fn write_pool_lock(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        amount: i64,
        duration: &str,
    ) -> Result<(), OpsError>;

    /// Unlock an expired write pool.
    async fn write_pool_unlock(&self, wallet: &str, pool_id: &str) -> Result<(), OpsError>;

    /// Write pools of a wallet.
    async fn write_pool_info(&self, wallet: &str) -> Result<Vec<WritePoolInfo>, OpsError>;

    /// Lock tokens in the wallet's read pool.
    async fn read_pool_lock(&self, wallet: &str, amount: i64) -> Result<(), OpsError>;

    /// Unlock the wallet's read pool.
    async fn read_pool_unlock(&self, wallet: &str) -> Result<(), OpsError>;

    /// Upload a local file.
    async fn upload(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        local: &Path,
        remote: &str,
    ) -> Result<(), OpsError>;

    /// Delete a remote file.
    async fn delete_file(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        remote: &str,
    ) -> Result<(), OpsError>;
}
