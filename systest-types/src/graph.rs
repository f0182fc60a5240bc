//! Aggregate ("graph") API types.
//!
//! Graph endpoints return a time series of an aggregate metric over a round
//! range: `GET /v2/graph-<metric>?from=<round>&to=<round>&data-points=<n>`.
//! Total endpoints return the latest value of a metric as a bare integer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SystestError;

/// Query of a graph endpoint.
///
/// Parameters are kept as raw strings so that tests can send malformed values
/// on purpose. `None` means the parameter is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRequest {
    /// Start round.
    pub from: Option<String>,
    /// End round.
    pub to: Option<String>,
    /// Number of points to return.
    pub data_points: Option<String>,
}

impl GraphRequest {
    /// Request the latest `n` points with the default round range.
    pub fn points(n: u32) -> Self {
        Self {
            data_points: Some(n.to_string()),
            ..Default::default()
        }
    }

    /// Request `n` points over the round range `[from, to]`.
    pub fn range(from: i64, to: i64, n: u32) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            data_points: Some(n.to_string()),
        }
    }

    /// Request with arbitrary raw parameter values.
    pub fn raw(from: &str, to: &str, data_points: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            data_points: Some(data_points.to_string()),
        }
    }

    /// Query-string pairs for the parameters that are present.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(3);
        if let Some(from) = &self.from {
            query.push(("from".to_string(), from.clone()));
        }
        if let Some(to) = &self.to {
            query.push(("to".to_string(), to.clone()));
        }
        if let Some(points) = &self.data_points {
            query.push(("data-points".to_string(), points.clone()));
        }
        query
    }
}

/// A series of graph points, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphPoints(pub Vec<i64>);

impl GraphPoints {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most recent point.
    pub fn latest(&self) -> Option<i64> {
        self.0.last().copied()
    }

    /// Borrow the raw values.
    pub fn values(&self) -> &[i64] {
        &self.0
    }
}

/// Response of the challenge graph: two parallel series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengePoints {
    /// Total challenges issued.
    #[serde(default)]
    pub total_challenges: Vec<i64>,
    /// Challenges passed.
    #[serde(default)]
    pub successful_challenges: Vec<i64>,
}

macro_rules! metric_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal {
            $($(#[$vmeta:meta])* $variant:ident => $slug:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every metric of this kind.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Short name used on the command line.
            pub fn slug(self) -> &'static str {
                match self {
                    $($name::$variant => $slug,)+
                }
            }

            /// Request path of the endpoint.
            pub fn path(self) -> String {
                format!(concat!($prefix, "{}"), self.slug())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.slug())
            }
        }

        impl FromStr for $name {
            type Err = SystestError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|m| m.slug() == s)
                    .ok_or_else(|| SystestError::UnknownMetric(s.to_string()))
            }
        }
    };
}

metric_enum!(
    /// Network-wide graph metrics (`/v2/graph-<slug>`).
    GraphMetric, "/v2/graph-" {
        /// Stake-weighted average write price.
        WritePrice => "write-price",
        /// Tokens held in challenge pools.
        TotalChallengePools => "total-challenge-pools",
        /// Storage allocated to allocations.
        AllocatedStorage => "allocated-storage",
        /// Storage actually used by uploaded files.
        UsedStorage => "used-storage",
        /// Tokens staked with all providers.
        TotalStaked => "total-staked",
        /// Tokens minted.
        TotalMinted => "total-minted",
        /// Tokens locked in pools.
        TotalLocked => "total-locked",
        /// Circulating token supply.
        TokenSupply => "token-supply",
    }
);

metric_enum!(
    /// Per-blobber graph metrics (`/v2/graph-blobber-<slug>?id=<blobber>`).
    BlobberGraphMetric, "/v2/graph-blobber-" {
        /// Challenges passed.
        ChallengesPassed => "challenges-passed",
        /// Challenges completed (passed or failed).
        ChallengesCompleted => "challenges-completed",
        /// Challenges still open.
        ChallengesOpen => "challenges-open",
        /// Rounds without a health check.
        InactiveRounds => "inactive-rounds",
        /// Write price.
        WritePrice => "write-price",
        /// Capacity.
        Capacity => "capacity",
        /// Allocated storage.
        Allocated => "allocated",
        /// Stored data.
        SavedData => "saved-data",
        /// Data read.
        ReadData => "read-data",
        /// Total offers.
        OffersTotal => "offers-total",
        /// Total staked.
        StakeTotal => "stake-total",
        /// Total unstaked.
        UnstakeTotal => "unstake-total",
        /// Total rewards.
        TotalRewards => "total-rewards",
    }
);

metric_enum!(
    /// Latest-value metrics (`/v2/<slug>`).
    TotalMetric, "/v2/" {
        /// Stake-weighted average write price.
        AverageWritePrice => "average-write-price",
        /// Storage allocated to allocations.
        TotalAllocatedStorage => "total-allocated-storage",
        /// Tokens staked with all providers.
        TotalStaked => "total-staked",
        /// Challenges issued.
        TotalChallenges => "total-challenges",
        /// Challenges passed.
        SuccessfulChallenges => "successful-challenges",
        /// Capacity offered by all blobbers.
        TotalBlobberCapacity => "total-blobber-capacity",
        /// Tokens minted.
        TotalMinted => "total-minted",
        /// Bytes stored.
        TotalStoredData => "total-stored-data",
    }
);

impl GraphMetric {
    /// Total endpoint reporting the latest value of the same metric, if any.
    pub fn latest_total(self) -> Option<TotalMetric> {
        match self {
            GraphMetric::WritePrice => Some(TotalMetric::AverageWritePrice),
            GraphMetric::AllocatedStorage => Some(TotalMetric::TotalAllocatedStorage),
            GraphMetric::TotalStaked => Some(TotalMetric::TotalStaked),
            GraphMetric::TotalMinted => Some(TotalMetric::TotalMinted),
            GraphMetric::UsedStorage => Some(TotalMetric::TotalStoredData),
            _ => None,
        }
    }
}
