// src/process/columns.rs
use serde::Deserialize;

use crate::table::RecordSet;

/// Which columns the pipeline looks for, and how it recognises them.
///
/// Matching is by exact name except for price columns, which match on a
/// substring of the header.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnRules {
    /// Sort-indicator glyphs stripped from every header.
    pub header_marker: String,
    pub company: String,
    /// Raw exchange symbol columns, highest priority first.
    pub symbol_candidates: Vec<String>,
    /// Header substrings that mark a currency column.
    pub price_markers: Vec<String>,
    pub ticker: String,
    pub live_price: String,
    pub issue_price: String,
    pub listing_price: String,
    pub listing_gain: String,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            header_marker: "▲▼".to_string(),
            company: "Company".to_string(),
            symbol_candidates: vec![
                "Symbol".to_string(),
                "NSE Symbol".to_string(),
                "Ticker".to_string(),
            ],
            price_markers: vec!["Price".to_string(), "Rs".to_string()],
            ticker: "YF_Ticker".to_string(),
            live_price: "Live_Price".to_string(),
            issue_price: "Issue Price (Rs.)".to_string(),
            listing_price: "Close Price on Listing (Rs.)".to_string(),
            listing_gain: "Listing_Gain_Pct".to_string(),
        }
    }
}

impl ColumnRules {
    pub fn clean_header(&self, raw: &str) -> String {
        if self.header_marker.is_empty() {
            return raw.trim().to_string();
        }
        raw.replace(&self.header_marker, "").trim().to_string()
    }

    /// First symbol column present in `rs`, in priority order.
    pub fn symbol_column<'a>(&'a self, rs: &RecordSet) -> Option<&'a str> {
        self.symbol_candidates
            .iter()
            .find(|c| rs.has_column(c))
            .map(String::as_str)
    }

    pub fn is_price_column(&self, name: &str) -> bool {
        self.price_markers.iter().any(|m| name.contains(m.as_str()))
    }

    /// Indices of every currency column in `rs`.
    pub fn price_columns(&self, rs: &RecordSet) -> Vec<usize> {
        rs.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| self.is_price_column(c))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_lose_sort_marker() {
        let rules = ColumnRules::default();
        assert_eq!(rules.clean_header(" Company ▲▼ "), "Company");
        assert_eq!(rules.clean_header("Issue Price (Rs.)▲▼"), "Issue Price (Rs.)");
        assert_eq!(rules.clean_header("Lot Size"), "Lot Size");
    }

    #[test]
    fn symbol_priority_order() {
        let rules = ColumnRules::default();
        let rs = RecordSet::new(vec!["Ticker".into(), "NSE Symbol".into(), "Company".into()]);
        assert_eq!(rules.symbol_column(&rs), Some("NSE Symbol"));

        let rs = RecordSet::new(vec!["Company".into()]);
        assert_eq!(rules.symbol_column(&rs), None);
    }

    #[test]
    fn price_columns_match_by_substring() {
        let rules = ColumnRules::default();
        let rs = RecordSet::new(vec![
            "Company".into(),
            "Issue Price (Rs.)".into(),
            "Issue Size (Rs cr.)".into(),
            "Listing Date".into(),
            "Current Price".into(),
        ]);
        assert_eq!(rules.price_columns(&rs), vec![1, 2, 4]);
        // case-sensitive, like the report's headers
        assert!(!rules.is_price_column("price band"));
    }
}
