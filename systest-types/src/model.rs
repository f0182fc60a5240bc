//! REST response models of the storage network.
//!
//! Field names follow the JSON emitted by the sharders. Every field the tests
//! do not strictly need is defaulted so that newer network versions adding or
//! dropping fields don't break decoding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{AllocationId, BlobberId};
use crate::SystestError;

/// Kind of stake-pool provider, as used in stake-pool requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProviderType {
    /// Miner node.
    Miner = 1,
    /// Sharder node.
    Sharder = 2,
    /// Storage provider.
    Blobber = 3,
    /// Challenge validator.
    Validator = 4,
    /// Bridge authorizer.
    Authorizer = 5,
}

impl ProviderType {
    /// Wire discriminator.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ProviderType {
    type Error = SystestError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Miner),
            2 => Ok(Self::Sharder),
            3 => Ok(Self::Blobber),
            4 => Ok(Self::Validator),
            5 => Ok(Self::Authorizer),
            other => Err(SystestError::InvalidProviderType(other)),
        }
    }
}

impl From<ProviderType> for u8 {
    fn from(value: ProviderType) -> Self {
        value.as_u8()
    }
}

/// Pricing terms offered by a blobber.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlobberTerms {
    /// Price per GB read, in base units.
    #[serde(default)]
    pub read_price: i64,
    /// Price per GB written, in base units.
    #[serde(default)]
    pub write_price: i64,
    /// Minimum lock demand ratio.
    #[serde(default)]
    pub min_lock_demand: f64,
}

/// Stake pool settings of a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakePoolSettings {
    /// Wallet receiving delegate rewards.
    #[serde(default)]
    pub delegate_wallet: String,
    /// Minimum stake accepted per delegate.
    #[serde(default)]
    pub min_stake: i64,
    /// Maximum stake accepted per delegate.
    #[serde(default)]
    pub max_stake: i64,
    /// Maximum number of delegates.
    #[serde(default)]
    pub num_delegates: u32,
    /// Service charge ratio kept by the provider.
    #[serde(default)]
    pub service_charge: f64,
}

/// A storage provider as reported by the storage smart contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blobber {
    /// Blobber id.
    pub id: BlobberId,
    /// Base URL of the blobber HTTP API.
    #[serde(default, rename = "url")]
    pub base_url: String,
    /// Pricing terms.
    #[serde(default)]
    pub terms: BlobberTerms,
    /// Total capacity offered, bytes.
    #[serde(default)]
    pub capacity: i64,
    /// Capacity allocated to allocations, bytes.
    #[serde(default)]
    pub allocated: i64,
    /// Bytes actually stored.
    #[serde(default)]
    pub saved_data: i64,
    /// Total stake delegated to the blobber, base units.
    #[serde(default)]
    pub total_stake: i64,
    /// Unix time of the last health check.
    #[serde(default)]
    pub last_health_check: i64,
    /// Stake pool settings.
    #[serde(default)]
    pub stake_pool_settings: StakePoolSettings,
}

impl Blobber {
    /// Blobber with the given id and every figure zeroed.
    pub fn new(id: BlobberId) -> Self {
        Self {
            id,
            base_url: String::new(),
            terms: BlobberTerms::default(),
            capacity: 0,
            allocated: 0,
            saved_data: 0,
            total_stake: 0,
            last_health_check: 0,
            stake_pool_settings: StakePoolSettings::default(),
        }
    }
}

/// Blobber reference inside an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationBlobber {
    /// Blobber id.
    pub id: BlobberId,
    /// Blobber base URL.
    #[serde(default)]
    pub url: String,
}

/// A storage allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Allocation id.
    pub id: AllocationId,
    /// Owner wallet id.
    #[serde(default)]
    pub owner_id: String,
    /// Number of data shards.
    #[serde(default)]
    pub data_shards: u32,
    /// Number of parity shards.
    #[serde(default)]
    pub parity_shards: u32,
    /// Allocation size, bytes.
    #[serde(default)]
    pub size: i64,
    /// Unix expiration time.
    #[serde(default)]
    pub expiration_date: i64,
    /// Blobbers serving the allocation.
    #[serde(default)]
    pub blobbers: Vec<AllocationBlobber>,
}

impl Allocation {
    /// Whether the given blobber serves this allocation.
    pub fn uses_blobber(&self, id: &BlobberId) -> bool {
        self.blobbers.iter().any(|b| &b.id == id)
    }
}

/// Wallet balance as returned by the sharders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Balance, base units.
    #[serde(default)]
    pub balance: i64,
    /// Next transaction nonce.
    #[serde(default)]
    pub nonce: i64,
    /// Round the balance was read at.
    #[serde(default)]
    pub round: i64,
}

/// One delegate's share of a stake pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatePool {
    /// Delegate pool id.
    #[serde(default)]
    pub id: String,
    /// Staked balance, base units.
    #[serde(default)]
    pub balance: i64,
    /// Accrued rewards, base units.
    #[serde(default)]
    pub rewards: i64,
    /// Delegating wallet.
    #[serde(default)]
    pub delegate_id: String,
}

/// Stake pool statistics of one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePoolStat {
    /// Provider id owning the pool.
    #[serde(default, rename = "pool_id")]
    pub provider_id: String,
    /// Total staked balance, base units.
    #[serde(default)]
    pub balance: i64,
    /// Total rewards earned, base units.
    #[serde(default)]
    pub rewards: i64,
    /// Delegate pools.
    #[serde(default, rename = "delegate")]
    pub delegates: Vec<DelegatePool>,
}

/// Stake pools a given wallet participates in, keyed by provider id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStakePoolStat {
    /// Provider id -> delegate pools of this wallet.
    #[serde(default)]
    pub pools: HashMap<String, Vec<DelegatePool>>,
}

impl UserStakePoolStat {
    /// Balance this wallet has staked with the given provider.
    pub fn stake_for(&self, provider_id: &str) -> Option<i64> {
        self.pools
            .get(provider_id)
            .and_then(|pools| pools.first())
            .map(|p| p.balance)
    }
}

/// Miner statistics (only the fields the harness needs).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerStats {
    /// Last round finalized by the network.
    #[serde(default)]
    pub last_finalized_round: i64,
}

/// A miner or sharder node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Node id.
    #[serde(default)]
    pub id: String,
    /// Node host.
    #[serde(default)]
    pub n2n_host: String,
    /// Total stake delegated to the node.
    #[serde(default)]
    pub total_stake: i64,
}

/// A challenge validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Validator id.
    #[serde(default)]
    pub validator_id: String,
    /// Validator base URL.
    #[serde(default)]
    pub url: String,
    /// Total stake delegated to the validator.
    #[serde(default)]
    pub total_stake: i64,
}

/// Per-blobber share of a write pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritePoolBlobber {
    /// Blobber id.
    pub blobber_id: String,
    /// Share of the pool, base units.
    #[serde(default)]
    pub balance: i64,
}

/// Write pool information as printed by `zbox wp-info --json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritePoolInfo {
    /// Pool id.
    pub id: String,
    /// Pool balance, base units.
    #[serde(default)]
    pub balance: i64,
    /// Unix time the lock expires.
    #[serde(default)]
    pub expire_at: i64,
    /// Allocation the pool belongs to.
    #[serde(default)]
    pub allocation_id: String,
    /// Per-blobber split.
    #[serde(default)]
    pub blobbers: Vec<WritePoolBlobber>,
    /// Whether the tokens are still locked.
    #[serde(default)]
    pub locked: bool,
}

impl WritePoolInfo {
    /// Whether this pool was created by `newallocation` (such pools share the
    /// allocation id).
    pub fn is_allocation_pool(&self) -> bool {
        self.id == self.allocation_id
    }
}
