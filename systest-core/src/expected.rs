//! Expected aggregate values derived from a blobber list.
//!
//! The aggregate endpoints are computed by the network from the same
//! per-blobber figures the sharder exposes, so a test can fetch every blobber
//! and recompute what the latest graph point should be.

use systest_types::{Blobber, BlobberId};

/// Bytes in a gigabyte, as used for price units.
pub const GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Rounding slack accepted when comparing a recomputed write price.
pub const WRITE_PRICE_TOLERANCE: i64 = 1000;

/// Stake-weighted average write price.
///
/// Each blobber's weight is the storage its stake can cover
/// (`total_stake / write_price` gigabytes). Blobbers with a non-positive
/// write price carry no weight. Returns 0 when nothing is staked.
pub fn expected_avg_write_price(blobbers: &[Blobber]) -> i64 {
    let staked_storage: Vec<(i64, i64)> = blobbers
        .iter()
        .filter(|b| b.terms.write_price > 0)
        .map(|b| {
            let ss = (b.total_stake as f64 / b.terms.write_price as f64) * GB;
            (ss as i64, b.terms.write_price)
        })
        .collect();

    let total: i64 = staked_storage.iter().map(|(ss, _)| ss).sum();
    if total <= 0 {
        return 0;
    }

    staked_storage
        .iter()
        .map(|&(ss, price)| ((ss as f64 / total as f64) * price as f64) as i64)
        .sum()
}

/// Sum of storage allocated on every blobber.
pub fn expected_allocated(blobbers: &[Blobber]) -> i64 {
    blobbers.iter().map(|b| b.allocated).sum()
}

/// Sum of data stored on every blobber.
pub fn expected_saved_data(blobbers: &[Blobber]) -> i64 {
    blobbers.iter().map(|b| b.saved_data).sum()
}

/// Sum of capacity offered by every blobber.
pub fn total_capacity(blobbers: &[Blobber]) -> i64 {
    blobbers.iter().map(|b| b.capacity).sum()
}

/// Sum of stake held by every blobber.
pub fn total_stake(blobbers: &[Blobber]) -> i64 {
    blobbers.iter().map(|b| b.total_stake).sum()
}

/// How a write pool balance is divided between the blobbers of an allocation.
///
/// Each blobber receives a share proportional to its write price. Returns an
/// empty split when no blobber has a positive price.
pub fn write_pool_split(balance: i64, blobbers: &[Blobber]) -> Vec<(BlobberId, i64)> {
    let total: i64 = blobbers
        .iter()
        .map(|b| b.terms.write_price.max(0))
        .sum();
    if total == 0 {
        return Vec::new();
    }
    blobbers
        .iter()
        .map(|b| {
            let ratio = b.terms.write_price.max(0) as f64 / total as f64;
            (b.id.clone(), (balance as f64 * ratio) as i64)
        })
        .collect()
}

/// Whether `actual` is within `tolerance` of `expected`.
pub fn within_tolerance(expected: i64, actual: i64, tolerance: i64) -> bool {
    expected.abs_diff(actual) <= tolerance.unsigned_abs()
}
