//! Token unit conversions.
//!
//! Balances travel as integers of base units: 1 ZCN = 10^10 units. The CLI
//! prints human amounts with a metric prefix (`1.500 ZCN`, `500.000 mZCN`).

use crate::SystestError;

/// Base units per ZCN.
pub const ZCN: i64 = 10_000_000_000;

/// Convert a ZCN amount to base units, rounding to the nearest unit.
pub fn zcn_to_int(zcn: f64) -> i64 {
    (zcn * ZCN as f64).round() as i64
}

/// Convert base units to a ZCN amount.
pub fn int_to_zcn(units: i64) -> f64 {
    units as f64 / ZCN as f64
}

/// Parse an amount with unit suffix (`"1.500 ZCN"`, `"500.000 mZCN"`,
/// `"12 uZCN"`) into base units.
pub fn parse_amount(text: &str) -> Result<i64, SystestError> {
    let mut parts = text.split_whitespace();
    let (number, unit) = match (parts.next(), parts.next()) {
        (Some(n), Some(u)) => (n, u),
        _ => return Err(SystestError::InvalidAmount(text.to_string())),
    };

    let value: f64 = number
        .parse()
        .map_err(|_| SystestError::InvalidAmount(text.to_string()))?;

    let scale = match unit {
        "ZCN" => 1.0,
        "mZCN" => 1e-3,
        "uZCN" => 1e-6,
        _ => return Err(SystestError::InvalidAmount(text.to_string())),
    };

    Ok(zcn_to_int(value * scale))
}

/// Parse a CLI balance line such as `Balance: 1.500 ZCN (0.12 USD)`.
pub fn parse_balance_line(line: &str) -> Result<i64, SystestError> {
    let rest = line
        .trim()
        .strip_prefix("Balance:")
        .ok_or_else(|| SystestError::InvalidAmount(line.to_string()))?;
    let amount = rest.split('(').next().unwrap_or(rest).trim();
    parse_amount(amount)
}
