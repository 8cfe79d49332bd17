// src/table/html.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

use super::{RecordSet, Value};

static TABLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("CSS selector for tables should be valid"));
static ROW_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("CSS selector for rows should be valid"));

/// One expanded grid row: cell text plus whether the cell was a `<th>`.
struct GridRow {
    in_thead: bool,
    cells: Vec<(String, bool)>,
}

/// Parse every `<table>` in `html` into a `RecordSet`, in document order.
///
/// - header rows come from `<thead>`, or failing that the leading rows made
///   only of `<th>` cells; with several header rows the last one names the
///   columns, with none the columns are `0`, `1`, ...
/// - `colspan`/`rowspan` are expanded so every grid slot holds the text of
///   the cell covering it
/// - blank header cells become `Unnamed: i`, duplicates get `.1`, `.2`, ...
/// - rows of nested tables belong to the nested table only
pub fn parse_tables(html: &str) -> Vec<RecordSet> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for (i, table) in doc.select(&TABLE_SEL).enumerate() {
        let grid = expand_grid(table);
        if grid.is_empty() {
            trace!(table = i, "skipping table without cells");
            continue;
        }
        let rs = grid_to_records(grid);
        debug!(table = i, columns = rs.columns.len(), rows = rs.len(), "parsed table");
        out.push(rs);
    }

    out
}

fn nearest<'a>(el: ElementRef<'a>, names: &[&str]) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| names.contains(&a.value().name()))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let raw: String = cell.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// browser limits for span attributes
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

fn span_attr(cell: ElementRef<'_>, name: &str, max: usize) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map_or(1, |n| n.min(max))
}

/// Lay the table's own rows out on a grid, expanding spans.
fn expand_grid(table: ElementRef<'_>) -> Vec<GridRow> {
    // column → (text, is_th, rows still to cover)
    let mut carry: BTreeMap<usize, (String, bool, usize)> = BTreeMap::new();
    let mut grid = Vec::new();

    for tr in table.select(&ROW_SEL) {
        if nearest(tr, &["table"]).map(|t| t.id()) != Some(table.id()) {
            continue;
        }
        let in_thead = nearest(tr, &["thead", "tbody", "tfoot", "table"])
            .map(|s| s.value().name() == "thead")
            .unwrap_or(false);

        let mut cells: Vec<(String, bool)> = Vec::new();
        let mut col = 0usize;
        let own_cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "th" | "td"));

        for cell in own_cells {
            fill_carried(&mut carry, &mut cells, &mut col);
            let text = cell_text(cell);
            let is_th = cell.value().name() == "th";
            let colspan = span_attr(cell, "colspan", MAX_COLSPAN);
            let rowspan = span_attr(cell, "rowspan", MAX_ROWSPAN);
            for _ in 0..colspan {
                if rowspan > 1 {
                    carry.insert(col, (text.clone(), is_th, rowspan - 1));
                }
                cells.push((text.clone(), is_th));
                col += 1;
            }
        }
        // trailing rowspans past the last explicit cell
        while carry.keys().any(|&c| c >= col) {
            fill_carried(&mut carry, &mut cells, &mut col);
            if carry.contains_key(&col) {
                continue;
            }
            match carry.range(col..).next().map(|(&c, _)| c) {
                Some(next) => {
                    while col < next {
                        cells.push((String::new(), false));
                        col += 1;
                    }
                }
                None => break,
            }
        }

        if !cells.is_empty() {
            grid.push(GridRow { in_thead, cells });
        }
    }

    grid
}

fn fill_carried(
    carry: &mut BTreeMap<usize, (String, bool, usize)>,
    cells: &mut Vec<(String, bool)>,
    col: &mut usize,
) {
    while let Some((text, is_th, left)) = carry.get(col).cloned() {
        cells.push((text.clone(), is_th));
        if left <= 1 {
            carry.remove(col);
        } else {
            carry.insert(*col, (text, is_th, left - 1));
        }
        *col += 1;
    }
}

fn grid_to_records(grid: Vec<GridRow>) -> RecordSet {
    let header_count = if grid.iter().any(|r| r.in_thead) {
        grid.iter().take_while(|r| r.in_thead).count()
    } else {
        grid.iter()
            .take_while(|r| r.cells.iter().all(|(_, th)| *th))
            .count()
    };

    let mut rows = grid.into_iter();
    let header: Option<Vec<String>> = rows
        .by_ref()
        .take(header_count)
        .last()
        .map(|r| r.cells.into_iter().map(|(t, _)| t).collect());
    let body: Vec<Vec<String>> = rows
        .map(|r| r.cells.into_iter().map(|(t, _)| t).collect())
        .collect();

    let width = body
        .iter()
        .map(Vec::len)
        .chain(header.as_ref().map(Vec::len))
        .max()
        .unwrap_or(0);

    let columns = match header {
        Some(h) => header_names(h, width),
        None => (0..width).map(|i| i.to_string()).collect(),
    };

    let mut rs = RecordSet::new(columns);
    for cells in body {
        rs.push_row(cells.iter().map(|c| Value::infer(c)).collect());
    }
    rs
}

fn header_names(header: Vec<String>, width: usize) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    (0..width)
        .map(|i| {
            let name = match header.get(i).map(|h| h.trim()) {
                Some(h) if !h.is_empty() => h.to_string(),
                _ => format!("Unnamed: {}", i),
            };
            let n = seen.entry(name.clone()).or_insert(0);
            let out = if *n == 0 {
                name
            } else {
                format!("{}.{}", name, n)
            };
            *n += 1;
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thead_and_body() {
        let html = r#"
            <html><body>
            <table>
              <thead><tr><th>Company ▲▼</th><th>Issue Price (Rs.)</th></tr></thead>
              <tbody>
                <tr><td> Acme   Limited </td><td>₹100</td></tr>
                <tr><td>Beta Ltd</td><td>1,250</td></tr>
              </tbody>
            </table>
            </body></html>"#;

        let tables = parse_tables(html);
        assert_eq!(tables.len(), 1);
        let t = &tables[0];
        assert_eq!(t.columns, vec!["Company ▲▼", "Issue Price (Rs.)"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[0][0], Value::Text("Acme Limited".into()));
        assert_eq!(t.rows[0][1], Value::Text("₹100".into()));
        assert_eq!(t.rows[1][1], Value::Int(1250));
    }

    #[test]
    fn leading_th_row_is_header_without_thead() {
        let html = r#"<table>
            <tr><th>Company</th><th></th><th>Company</th></tr>
            <tr><td>Acme</td><td>x</td><td>y</td><td>extra</td></tr>
        </table>"#;

        let t = &parse_tables(html)[0];
        assert_eq!(t.columns, vec!["Company", "Unnamed: 1", "Company.1", "Unnamed: 3"]);
        assert_eq!(t.rows[0][3], Value::Text("extra".into()));
    }

    #[test]
    fn no_header_uses_positions() {
        let t = &parse_tables("<table><tr><td>a</td><td></td></tr></table>")[0];
        assert_eq!(t.columns, vec!["0", "1"]);
        assert_eq!(t.rows[0], vec![Value::Text("a".into()), Value::Null]);
    }

    #[test]
    fn spans_are_expanded() {
        let html = r#"<table>
            <thead><tr><th colspan="2">Name</th><th>Price</th></tr></thead>
            <tr><td rowspan="2">A</td><td>x</td><td>1</td></tr>
            <tr><td>y</td><td>2</td></tr>
        </table>"#;

        let t = &parse_tables(html)[0];
        assert_eq!(t.columns, vec!["Name", "Name.1", "Price"]);
        assert_eq!(t.rows[1][0], Value::Text("A".into()));
        assert_eq!(t.rows[1][1], Value::Text("y".into()));
        assert_eq!(t.rows[1][2], Value::Int(2));
    }

    #[test]
    fn oversized_spans_are_clamped() {
        let html = r#"<table>
            <tr><th>A</th></tr>
            <tr><td colspan="1000000000">x</td></tr>
            <tr><td rowspan="99999999">y</td></tr>
            <tr><td colspan="abc">z</td></tr>
        </table>"#;

        let t = &parse_tables(html)[0];
        assert_eq!(t.columns.len(), MAX_COLSPAN);
        assert_eq!(t.rows[0][MAX_COLSPAN - 1], Value::Text("x".into()));
        assert_eq!(t.rows[1][0], Value::Text("y".into()));
        // carried rowspan fills the first slot, the explicit cell shifts right
        assert_eq!(t.rows[2][0], Value::Text("y".into()));
        assert_eq!(t.rows[2][1], Value::Text("z".into()));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn nested_tables_are_separate() {
        let html = r#"<table>
            <tr><th>Outer</th></tr>
            <tr><td><table><tr><th>Inner</th></tr><tr><td>1</td></tr></table></td></tr>
        </table>"#;

        let tables = parse_tables(html);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].columns, vec!["Outer"]);
        assert_eq!(tables[0].len(), 1);
        assert_eq!(tables[1].columns, vec!["Inner"]);
        assert_eq!(tables[1].rows[0][0], Value::Int(1));
    }

    #[test]
    fn page_without_tables_yields_nothing() {
        assert!(parse_tables("<html><body><p>blocked</p></body></html>").is_empty());
    }
}
