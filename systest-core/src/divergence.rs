//! Known inconsistencies of the network under test.
//!
//! Some scenarios observe behavior that disagrees with what the protocol
//! documents. Each such case is registered here with an upstream reference,
//! and assertions that touch it check the tolerated condition while the
//! strict condition is only reported. Remove an entry once the upstream fix
//! ships and the strict condition holds.

use serde::Serialize;

/// A documented divergence between expected and observed behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownDivergence {
    /// Stable identifier used in logs.
    pub id: &'static str,
    /// What the network does instead of the expected behavior.
    pub summary: &'static str,
    /// Upstream issue, when one is filed.
    pub reference: Option<&'static str>,
    /// Text the divergent behavior leaves in command output.
    pub signature: Option<&'static str>,
}

impl KnownDivergence {
    /// Allocated and saved data totals do not drop when an allocation is
    /// cancelled.
    pub const CANCEL_KEEPS_USAGE: KnownDivergence = KnownDivergence {
        id: "cancel-keeps-usage",
        summary: "allocated and saved data totals do not decrease after an allocation is cancelled",
        reference: Some("https://github.com/0chain/0chain/issues/2211"),
        signature: None,
    };

    /// Write pool info failures are reported as read pool failures.
    pub const WRITE_POOL_INFO_SAYS_READ_POOL: KnownDivergence = KnownDivergence {
        id: "wp-info-read-pool-message",
        summary: "write pool info errors mention the read pool",
        reference: None,
        signature: Some("Failed to get write pool info: error requesting read pool info:"),
    };

    /// A write pool lock may outlive its allocation.
    pub const LOCK_PAST_ALLOCATION_EXPIRY: KnownDivergence = KnownDivergence {
        id: "wp-lock-past-expiry",
        summary: "write pool locks longer than the allocation's lifetime are accepted without a warning",
        reference: None,
        signature: None,
    };

    /// Every registered divergence.
    pub const ALL: &'static [KnownDivergence] = &[
        Self::CANCEL_KEEPS_USAGE,
        Self::WRITE_POOL_INFO_SAYS_READ_POOL,
        Self::LOCK_PAST_ALLOCATION_EXPIRY,
    ];

    /// Whether `output` carries this divergence's signature.
    pub fn seen_in(&self, output: &str) -> bool {
        self.signature.is_some_and(|s| output.contains(s))
    }
}

/// Result of checking an assertion that touches a known divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceOutcome {
    /// The documented behavior holds; the divergence may be fixed upstream.
    Strict,
    /// Only the tolerated behavior holds.
    Tolerated,
    /// Neither holds; this is a real failure.
    Violated,
}

impl DivergenceOutcome {
    /// Classify a pair of conditions.
    pub fn evaluate(strict: bool, tolerated: bool) -> Self {
        if strict {
            Self::Strict
        } else if tolerated {
            Self::Tolerated
        } else {
            Self::Violated
        }
    }

    /// Whether the assertion passes.
    pub fn passed(self) -> bool {
        !matches!(self, Self::Violated)
    }
}
