//! Cell value coercion.
//!
//! Converts one raw cell's text into a typed [`CellValue`] according to the
//! column's declared [`CoercionKind`]. Failure is a value, not an error: any
//! cell that does not parse becomes [`CellValue::Missing`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CellValue, CoercionKind};

/// Plain decimal number after separators and the `%` marker are removed.
///
/// Keeps `inf`, `NaN` and friends (which `f64::from_str` accepts) out.
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid number regex")
});

/// Coerce a raw cell to the given kind.
///
/// - Text: trimmed, `Missing` when empty.
/// - Numeric kinds: thousands separators and whitespace are dropped; a
///   trailing `%` divides by 100. Whether division happens depends on the
///   marker being present, never on the kind alone.
/// - Count: integer when the value is whole, float otherwise; a `%` is not a count.
pub fn coerce(raw: &str, kind: CoercionKind) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Missing;
    }

    match kind {
        CoercionKind::Text => CellValue::Text(trimmed.to_string()),
        CoercionKind::Count => match parse_number(trimmed) {
            Some((value, false)) => whole_or_float(value),
            _ => CellValue::Missing,
        },
        CoercionKind::Percentage | CoercionKind::Ratio | CoercionKind::PlainNumeric => {
            match parse_number(trimmed) {
                Some((value, true)) => CellValue::Float(value / 100.0),
                Some((value, false)) => CellValue::Float(value),
                None => CellValue::Missing,
            }
        }
    }
}

/// Strip separators and a trailing `%`, then parse.
///
/// Returns the value and whether the `%` marker was present.
fn parse_number(raw: &str) -> Option<(f64, bool)> {
    let (body, percent) = match raw.strip_suffix('%') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if !NUMBER.is_match(&cleaned) {
        return None;
    }

    cleaned.parse::<f64>().ok().map(|v| (v, percent))
}

fn whole_or_float(value: f64) -> CellValue {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        CellValue::Int(value as i64)
    } else {
        CellValue::Float(value)
    }
}

/// Whether a raw cell failed to coerce (had content but became `Missing`).
pub fn is_coercion_failure(raw: &str, coerced: &CellValue) -> bool {
    coerced.is_missing() && !raw.trim().is_empty()
}
