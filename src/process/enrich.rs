// src/process/enrich.rs
use tracing::{debug, info, instrument};

use super::columns::ColumnRules;
use super::currency;
use crate::fetch::PriceSource;
use crate::table::{RecordSet, Value};

/// What happened to one price lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceOutcome {
    /// Price attached, already rounded to two decimals.
    Priced(f64),
    /// The service answered with zero or a negative price.
    NonPositive(f64),
    /// The service had no price for the ticker.
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceAttempt {
    pub row: usize,
    pub ticker: String,
    pub outcome: PriceOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichReport {
    /// Rows that had a ticker at all.
    pub with_ticker: usize,
    /// One entry per lookup, in row order.
    pub attempts: Vec<PriceAttempt>,
}

impl EnrichReport {
    pub fn priced(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, PriceOutcome::Priced(_)))
            .count()
    }
}

/// Two decimals, exact halves to the even digit (`1234.125` → `1234.12`).
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Replace every currency cell with its plain numeric value.
pub fn normalize_price_columns(rs: &mut RecordSet, rules: &ColumnRules) {
    let cols = rules.price_columns(rs);
    debug!(columns = ?cols.iter().map(|&i| &rs.columns[i]).collect::<Vec<_>>(), "normalizing currency columns");
    for row in &mut rs.rows {
        for &c in &cols {
            row[c] = Value::Float(currency::normalize(&row[c]));
        }
    }
}

/// Normalize currency columns, then attach live prices to the first `limit`
/// rows that have a ticker. Without a ticker column the set is returned as is.
#[instrument(level = "info", skip_all, fields(rows = rs.len(), limit = limit))]
pub async fn enrich(
    mut rs: RecordSet,
    prices: &(dyn PriceSource + Sync),
    rules: &ColumnRules,
    limit: usize,
) -> (RecordSet, EnrichReport) {
    let mut report = EnrichReport::default();
    let Some(ticker_col) = rs.column_index(&rules.ticker) else {
        return (rs, report);
    };

    info!("fetching live prices");
    normalize_price_columns(&mut rs, rules);

    let eligible: Vec<(usize, String)> = rs
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| match &row[ticker_col] {
            Value::Text(t) => Some((i, t.clone())),
            _ => None,
        })
        .collect();
    report.with_ticker = eligible.len();

    for (row, ticker) in eligible.into_iter().take(limit) {
        let outcome = match prices.latest_price(&ticker).await {
            Ok(Some(p)) if p > 0.0 => PriceOutcome::Priced(round2(p)),
            Ok(Some(p)) => PriceOutcome::NonPositive(p),
            Ok(None) => PriceOutcome::Missing,
            Err(e) => PriceOutcome::Failed(format!("{:#}", e)),
        };
        match &outcome {
            PriceOutcome::Priced(p) => {
                let live = rs.ensure_column(&rules.live_price);
                rs.rows[row][live] = Value::Float(*p);
                info!("    {}: ₹{}", ticker, p);
            }
            skipped => debug!(%ticker, outcome = ?skipped, "no live price"),
        }
        report.attempts.push(PriceAttempt {
            row,
            ticker,
            outcome,
        });
    }

    (rs, report)
}
