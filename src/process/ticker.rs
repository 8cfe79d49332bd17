// src/process/ticker.rs
use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::Value;

// corporate suffixes anywhere in the name, plus any parenthesised segment
static CORPORATE_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Limited|Ltd|LTD|LIMITED|\(.*\)").expect("ticker noise pattern should be valid")
});

/// Ticker from a raw exchange symbol: trimmed, suffixed, case untouched.
pub fn from_symbol(symbol: &Value, suffix: &str) -> Option<String> {
    if symbol.is_null() {
        return None;
    }
    Some(format!("{}{}", symbol.to_string().trim(), suffix))
}

/// Best-effort ticker from a company name, e.g. `Acme Limited` → `ACME.NS`.
///
/// Only text cells are considered; null, numeric and blank names give none.
pub fn from_company(name: &Value, suffix: &str) -> Option<String> {
    let name = name.as_str()?;
    let cleaned = CORPORATE_NOISE.replace_all(name, "");
    let first = cleaned.split_whitespace().next()?;
    Some(format!("{}{}", first.to_uppercase(), suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn company_names() {
        assert_eq!(from_company(&text("Acme Limited"), ".NS").as_deref(), Some("ACME.NS"));
        assert_eq!(
            from_company(&text("Beta Industries (BI)"), ".NS").as_deref(),
            Some("BETA.NS")
        );
        assert_eq!(
            from_company(&text("gamma ltd"), ".NS").as_deref(),
            Some("GAMMA.NS")
        );
        assert_eq!(
            from_company(&text("(SME) Delta Foods Ltd."), ".NS").as_deref(),
            Some("DELTA.NS")
        );
    }

    #[test]
    fn company_without_usable_name() {
        assert_eq!(from_company(&Value::Null, ".NS"), None);
        assert_eq!(from_company(&Value::Int(123), ".NS"), None);
        assert_eq!(from_company(&text("   "), ".NS"), None);
        assert_eq!(from_company(&text("Limited"), ".NS"), None);
        assert_eq!(from_company(&text("(Anything)"), ".NS"), None);
    }

    #[test]
    fn symbols_keep_their_case() {
        assert_eq!(from_symbol(&text(" xyz "), ".NS").as_deref(), Some("xyz.NS"));
        assert_eq!(from_symbol(&text("ACME"), ".NS").as_deref(), Some("ACME.NS"));
        assert_eq!(from_symbol(&Value::Int(500325), ".BO").as_deref(), Some("500325.BO"));
        assert_eq!(from_symbol(&Value::Null, ".NS"), None);
    }
}
