//! Table validation and empty-column pruning.
//!
//! The column count comes from the first header row and cells are matched
//! to columns by their position in the row. `colspan`/`rowspan` are not
//! expanded, so a spanning table survives only if every row still has at
//! most as many physical cells as the header.

use tracing::debug;

use crate::dom::{Document, NodeRef};

/// Per-table bookkeeping built while scanning rows.
struct TableModel<'a> {
    rows: Vec<NodeRef<'a>>,
    column_has_content: Vec<bool>,
}

enum Verdict<'a> {
    Discard(&'static str),
    Prune(TableModel<'a>),
}

pub fn normalize_tables(doc: Document) -> Document {
    for table in doc.select("table").nodes() {
        normalize_table(table);
    }
    doc
}

pub fn normalize_table(table: &NodeRef<'_>) {
    match analyze(table) {
        Verdict::Discard(reason) => {
            debug!(reason, "Removing table");
            table.remove_from_parent();
        }
        Verdict::Prune(model) => {
            for row in &model.rows {
                for (index, cell) in cells(row).into_iter().enumerate() {
                    if !model.column_has_content.get(index).copied().unwrap_or(false) {
                        cell.remove_from_parent();
                    }
                }
            }
        }
    }
}

fn analyze<'a>(table: &NodeRef<'a>) -> Verdict<'a> {
    let columns = header_columns(table);
    if columns == 0 {
        return Verdict::Discard("no header cells");
    }

    let rows = rows(table);
    let mut column_has_content = vec![false; columns];
    for row in &rows {
        for (index, cell) in cells(row).into_iter().enumerate() {
            if index >= columns {
                return Verdict::Discard("row wider than header");
            }
            if !cell.inner_html().is_empty() {
                column_has_content[index] = true;
            }
        }
    }

    Verdict::Prune(TableModel { rows, column_has_content })
}

fn header_columns(table: &NodeRef<'_>) -> usize {
    table
        .element_children()
        .into_iter()
        .find(|child| child.has_name("thead"))
        .and_then(|thead| thead.element_children().into_iter().find(|child| child.has_name("tr")))
        .map(|row| cells(&row).len())
        .unwrap_or(0)
}

/// Rows owned by this table (not by nested tables): header rows first,
/// then body and direct rows in tree order, then footer rows.
fn rows<'a>(table: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut head = Vec::new();
    let mut body = Vec::new();
    let mut foot = Vec::new();

    let section_rows = |section: &NodeRef<'a>| -> Vec<NodeRef<'a>> {
        section
            .element_children()
            .into_iter()
            .filter(|row| row.has_name("tr"))
            .collect()
    };
    for child in table.element_children() {
        if child.has_name("tr") {
            body.push(child);
        } else if child.has_name("thead") {
            head.extend(section_rows(&child));
        } else if child.has_name("tbody") {
            body.extend(section_rows(&child));
        } else if child.has_name("tfoot") {
            foot.extend(section_rows(&child));
        }
    }

    head.into_iter().chain(body).chain(foot).collect()
}

fn cells<'a>(row: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    row.element_children()
        .into_iter()
        .filter(|cell| cell.has_name("td") || cell.has_name("th"))
        .collect()
}
