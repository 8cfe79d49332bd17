// src/table/select.rs
use super::RecordSet;

/// Picks the canonical table out of everything parsed from a page.
pub trait TableSelector {
    fn select(&self, tables: Vec<RecordSet>) -> Option<RecordSet>;
}

/// The table with the most data rows; the first one wins a tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestTable;

impl TableSelector for LargestTable {
    fn select(&self, tables: Vec<RecordSet>) -> Option<RecordSet> {
        let mut best: Option<RecordSet> = None;
        for t in tables {
            // strict: an equal-sized later table never replaces the first
            if best.as_ref().map_or(true, |b| t.len() > b.len()) {
                best = Some(t);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn table(tag: &str, rows: usize) -> RecordSet {
        let mut rs = RecordSet::new(vec!["tag".into()]);
        for _ in 0..rows {
            rs.push_row(vec![Value::Text(tag.into())]);
        }
        rs
    }

    #[test]
    fn first_of_the_largest_wins() {
        let tables = vec![table("a", 3), table("b", 7), table("c", 7), table("d", 2)];
        let picked = LargestTable.select(tables).expect("a table");
        assert_eq!(picked.len(), 7);
        assert_eq!(picked.rows[0][0], Value::Text("b".into()));
    }

    #[test]
    fn nothing_to_pick() {
        assert!(LargestTable.select(Vec::new()).is_none());
    }

    #[test]
    fn empty_tables_still_selectable() {
        let picked = LargestTable.select(vec![table("a", 0)]);
        assert!(picked.is_some_and(|t| t.is_empty()));
    }
}
