// src/process/collect.rs
use anyhow::{anyhow, Result};
use tracing::{error, info, instrument, warn};
use url::Url;

use super::columns::ColumnRules;
use super::ticker;
use crate::fetch::PageSource;
use crate::table::{parse_tables, RecordSet, TableSelector, Value};

/// Result of the collection stage. Collection never fails loudly: anything
/// that goes wrong becomes `Empty` with the reason.
#[derive(Debug)]
pub enum CollectOutcome {
    Collected(RecordSet),
    Empty(String),
}

/// Fetch the report, pick its main table and attach a ticker to every row.
#[instrument(level = "info", skip(pages, selector, rules))]
pub fn collect(
    pages: &dyn PageSource,
    url: &Url,
    selector: &dyn TableSelector,
    rules: &ColumnRules,
    suffix: &str,
) -> CollectOutcome {
    let html = match pages.page_source(url) {
        Ok(html) => html,
        Err(e) => {
            error!(error = %format!("{:#}", e), "scraping error");
            return CollectOutcome::Empty(format!("fetch failed: {:#}", e));
        }
    };

    match records_from_html(&html, selector, rules, suffix) {
        Ok(Some(rs)) => {
            info!(rows = rs.len(), "captured IPO entries");
            CollectOutcome::Collected(rs)
        }
        Ok(None) => {
            warn!("no tables found");
            CollectOutcome::Empty("no tables found".to_string())
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "scraping error");
            CollectOutcome::Empty(format!("{:#}", e))
        }
    }
}

/// Everything after the fetch: parse, select, clean headers, drop rows
/// without a company and resolve tickers. `None` when the page has no table.
pub fn records_from_html(
    html: &str,
    selector: &dyn TableSelector,
    rules: &ColumnRules,
    suffix: &str,
) -> Result<Option<RecordSet>> {
    let Some(mut rs) = selector.select(parse_tables(html)) else {
        return Ok(None);
    };

    rs.map_columns(|c| rules.clean_header(c));

    let company = rs
        .column_index(&rules.company)
        .ok_or_else(|| anyhow!("no '{}' column in the report table", rules.company))?;
    rs.retain_rows(|row| !row[company].is_null());

    resolve_tickers(&mut rs, rules, suffix);
    Ok(Some(rs))
}

/// Fill the ticker column from a symbol column if the table has one,
/// otherwise from the company name.
pub fn resolve_tickers(rs: &mut RecordSet, rules: &ColumnRules, suffix: &str) {
    let symbol = rules.symbol_column(rs).and_then(|sym| rs.column_index(sym));
    let (source, by_symbol) = match (symbol, rs.column_index(&rules.company)) {
        (Some(idx), _) => (idx, true),
        (None, Some(idx)) => {
            info!("deriving tickers from company names");
            (idx, false)
        }
        (None, None) => return,
    };

    let target = rs.ensure_column(&rules.ticker);
    for row in &mut rs.rows {
        let derived = if by_symbol {
            ticker::from_symbol(&row[source], suffix)
        } else {
            ticker::from_company(&row[source], suffix)
        };
        row[target] = derived.map_or(Value::Null, Value::Text);
    }
}
