//! Decimal amounts and prices as the ledger encodes them.

use super::errors::{DomainError, DomainResult};
use super::xdr::{XdrEncode, XdrWriter};

/// Stroops per whole unit of any asset.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

const MAX_DECIMALS: usize = 7;

/// Parses a decimal amount such as `"100"` or `"12.5"` into stroops.
///
/// Rejects signs, exponents, more than seven fractional digits and values
/// that do not fit an `int64`. Zero is rejected unless `allow_zero` is set.
pub fn parse_amount(field: &'static str, value: &str, allow_zero: bool) -> DomainResult<i64> {
    let invalid = || DomainError::InvalidAmount {
        field,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > MAX_DECIMALS {
        return Err(invalid());
    }

    let whole_units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac_stroops: i64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = MAX_DECIMALS);
        padded.parse().map_err(|_| invalid())?
    };

    let stroops = whole_units
        .checked_mul(STROOPS_PER_UNIT)
        .and_then(|v| v.checked_add(frac_stroops))
        .ok_or_else(invalid)?;

    if stroops == 0 && !allow_zero {
        return Err(invalid());
    }
    Ok(stroops)
}

/// A rational price `n / d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    pub const ONE: Price = Price { n: 1, d: 1 };
}

impl XdrEncode for Price {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.n);
        w.write_i32(self.d);
    }
}
