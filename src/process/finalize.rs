// src/process/finalize.rs
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::{debug, instrument};

use super::columns::ColumnRules;
use crate::table::{RecordSet, Value};

/// Keep rows with a positive issue price and add the listing gain.
///
/// Passthrough unless both the issue and listing price columns exist.
/// Non-numeric issue prices count as not positive; a non-numeric listing
/// price leaves the gain null.
pub fn finalize(mut rs: RecordSet, rules: &ColumnRules) -> RecordSet {
    let (Some(issue), Some(listing)) = (
        rs.column_index(&rules.issue_price),
        rs.column_index(&rules.listing_price),
    ) else {
        debug!("price columns missing; passthrough");
        return rs;
    };

    let before = rs.len();
    rs.retain_rows(|row| row[issue].as_f64().is_some_and(|p| p > 0.0));
    debug!(dropped = before - rs.len(), "dropped rows without a positive issue price");

    let gain = rs.ensure_column(&rules.listing_gain);
    for row in &mut rs.rows {
        row[gain] = match (row[issue].as_f64(), row[listing].as_f64()) {
            (Some(i), Some(l)) => Value::Float((l - i) / i * 100.0),
            _ => Value::Null,
        };
    }
    rs
}

/// Write `rs` as CSV with a header row and no index column, creating the
/// parent directory first. Returns the number of data rows written.
#[instrument(level = "info", skip(rs, path), fields(path = %path.as_ref().display()))]
pub fn save<P: AsRef<Path>>(rs: &RecordSet, path: P) -> Result<usize> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }

    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {:?}", path))?;
    wtr.write_record(&rs.columns)
        .with_context(|| format!("writing header to {:?}", path))?;
    for row in &rs.rows {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .with_context(|| format!("writing row to {:?}", path))?;
    }
    wtr.flush().with_context(|| format!("flushing {:?}", path))?;
    Ok(rs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn priced(rows: &[(Value, Value)]) -> RecordSet {
        let mut rs = RecordSet::new(vec![
            "Company".into(),
            "Issue Price (Rs.)".into(),
            "Close Price on Listing (Rs.)".into(),
        ]);
        for (i, (issue, listing)) in rows.iter().enumerate() {
            rs.push_row(vec![
                Value::Text(format!("Co {}", i)),
                issue.clone(),
                listing.clone(),
            ]);
        }
        rs
    }

    #[test]
    fn gain_for_surviving_rows() {
        let rs = priced(&[
            (Value::Float(100.0), Value::Float(150.0)),
            (Value::Float(0.0), Value::Float(90.0)),
            (Value::Float(200.0), Value::Float(150.0)),
            (Value::Text("-".into()), Value::Float(10.0)),
            (Value::Int(50), Value::Null),
        ]);

        let out = finalize(rs, &ColumnRules::default());

        assert_eq!(out.len(), 3);
        assert_eq!(out.get(0, "Listing_Gain_Pct"), Some(&Value::Float(50.0)));
        assert_eq!(out.get(1, "Listing_Gain_Pct"), Some(&Value::Float(-25.0)));
        assert_eq!(out.get(2, "Company"), Some(&Value::Text("Co 4".into())));
        assert_eq!(out.get(2, "Listing_Gain_Pct"), Some(&Value::Null));
    }

    #[test]
    fn passthrough_without_both_columns() {
        let mut rs = RecordSet::new(vec!["Company".into(), "Issue Price (Rs.)".into()]);
        rs.push_row(vec![Value::Text("Acme".into()), Value::Float(0.0)]);
        let out = finalize(rs.clone(), &ColumnRules::default());
        assert_eq!(out, rs);
    }

    #[test]
    fn save_creates_directory_and_writes_header() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/out/ipo.csv");

        let mut rs = RecordSet::new(vec!["Company".into(), "Gain".into(), "Note".into()]);
        rs.push_row(vec![
            Value::Text("Acme, Inc".into()),
            Value::Float(50.0),
            Value::Null,
        ]);
        rs.push_row(vec![Value::Text("Beta".into()), Value::Int(3), Value::Text("ok".into())]);

        let written = save(&rs, &path)?;
        assert_eq!(written, 2);
        let text = fs::read_to_string(&path)?;
        assert_eq!(text, "Company,Gain,Note\n\"Acme, Inc\",50.0,\nBeta,3,ok\n");
        Ok(())
    }
}
