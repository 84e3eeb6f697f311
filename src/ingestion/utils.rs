//! Utility functions for common operations

use crate::ingestion::types::RawRow;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Separator used when a list of unit labels is stored as a single column
pub const UNIT_LIST_SEPARATOR: &str = ", ";

/// Column value by header, empty when the column is missing
pub fn field<'a>(row: &'a RawRow, column: &str) -> &'a str {
    row.get(column).map(|v| v.trim()).unwrap_or("")
}

/// Property identifier of a row, or None for blank ids and the synthetic
/// grand-total line
pub fn property_id(row: &RawRow) -> Option<&str> {
    let id = field(row, "Property ID");
    if id.is_empty() || id.eq_ignore_ascii_case("total") {
        None
    } else {
        Some(id)
    }
}

/// Report date from the first `YYYYMMDD` run in the file name
pub fn extract_report_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_string_lossy();
    let bytes = name.as_bytes();

    let start = bytes
        .windows(8)
        .position(|w| w.iter().all(u8::is_ascii_digit))?;
    let digits = &name[start..start + 8];

    let year = digits[0..4].parse::<i32>().ok()?;
    let month = digits[4..6].parse::<u32>().ok()?;
    let day = digits[6..8].parse::<u32>().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a report amount such as `1,200.50`, `$3,000` or the accounting
/// negative `(1,200.50)`. Only thousands separators and a currency sign are
/// removed; anything else makes the value unparseable.
pub fn parse_amount_opt(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    let cleaned: String = body.chars().filter(|c| *c != ',' && *c != '$').collect();
    if cleaned.is_empty() {
        return None;
    }

    let amount = Decimal::from_str(&cleaned).ok()?;
    if negative {
        if amount.is_sign_negative() {
            return None;
        }
        Some(-amount)
    } else {
        Some(amount)
    }
}

/// Same as [`parse_amount_opt`] but defaults to zero
pub fn parse_amount(value: &str) -> Decimal {
    parse_amount_opt(value).unwrap_or(Decimal::ZERO)
}

/// Receipt amounts are free-form: keep only digits, the decimal point and
/// the sign. Returns None when nothing parseable remains.
pub fn parse_receipt_amount(value: &str) -> Option<Decimal> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Add `amount` into `total`. On overflow `total` is left as it was and
/// false is returned.
pub fn add_amount(total: &mut Decimal, amount: Decimal) -> bool {
    match total.checked_add(amount) {
        Some(sum) => {
            *total = sum;
            true
        }
        None => false,
    }
}

/// Parse a lease end date (`MM/DD/YYYY` as exported, `YYYY-MM-DD` accepted)
pub fn parse_lease_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .ok()
}

/// Round half away from zero to two places and always carry two fractional digits
pub fn fixed2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// `part / whole * 100` to two places, `0.00` unless `whole` is positive.
/// A result too large to represent is also reported as `0.00`.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return fixed2(Decimal::ZERO);
    }

    match part
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
    {
        Some(pct) => fixed2(pct),
        None => {
            warn!("Percentage of {} over {} overflows, storing 0.00", part, whole);
            fixed2(Decimal::ZERO)
        }
    }
}

/// Unit-count variant of [`percentage`]
pub fn rate(part: usize, whole: usize) -> Decimal {
    percentage(Decimal::from(part as u64), Decimal::from(whole as u64))
}

/// Join unit labels for storage, never as a bracketed list literal
pub fn join_units(units: &[String]) -> String {
    units.join(UNIT_LIST_SEPARATOR)
}
