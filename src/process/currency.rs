// src/process/currency.rs
use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::Value;

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.]").expect("currency strip pattern should be valid"));

/// Display-formatted price → plain non-negative number.
///
/// Everything but ASCII digits and `.` is dropped before parsing, so signs,
/// currency glyphs and thousands separators all disappear. Null, `-`, empty
/// and unparseable input give 0.0. Applying it to its own output is a no-op.
pub fn normalize(value: &Value) -> f64 {
    let text = match value {
        Value::Null => return 0.0,
        // a sign is the only non-digit a plain number can carry
        Value::Int(i) => return i.unsigned_abs() as f64,
        Value::Float(f) if f.is_finite() => return f.abs(),
        Value::Float(_) => return 0.0,
        Value::Text(s) if s.trim() == "-" => return 0.0,
        Value::Text(s) => s,
    };
    let digits = NON_NUMERIC.replace_all(text, "");
    if digits.is_empty() {
        return 0.0;
    }
    digits.parse::<f64>().unwrap_or(0.0)
}
