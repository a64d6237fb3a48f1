//! ABBYY table column extraction.
//!
//! Each `<block blockType="Table">` becomes one [`LayoutBox`] per column.
//! Column edges come from the declared cell widths of the first row (the
//! second row when the first has spanning cells). When those widths do not
//! add up to the table width, columns are rebuilt from the boxes of the
//! text actually found in the cells.

use super::markup::{scan, Node, Tag};
use crate::model::{round_half_up, BBox, LayoutBox, LayoutBoxes};
use uuid::Uuid;

/// Tolerance between summed column widths and the table width.
const WIDTH_TOLERANCE: i32 = 10;

#[derive(Debug, Default)]
struct Cell {
    width: Option<i32>,
    boxes: Vec<BBox>,
}

#[derive(Debug, Default)]
struct Row {
    cells: Vec<Cell>,
    spans: bool,
}

#[derive(Debug)]
struct Table {
    coords: Option<BBox>,
    rows: Vec<Row>,
}

fn is_table_block(tag: &Tag) -> bool {
    tag.name == "block" && tag.attr("blockType").is_some_and(|t| t.eq_ignore_ascii_case("Table"))
}

/// Collect table blocks with their rows and cells.
fn scan_tables(markup: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Option<Table> = None;

    for node in scan(markup) {
        match node {
            Node::Open(tag) if is_table_block(&tag) => {
                if let Some(table) = current.take() {
                    tables.push(table);
                }
                current = Some(Table {
                    coords: tag.ltrb(),
                    rows: Vec::new(),
                });
            }
            Node::Open(tag) => {
                let Some(table) = current.as_mut() else {
                    continue;
                };
                match tag.name {
                    "row" => table.rows.push(Row::default()),
                    "cell" => {
                        if let Some(row) = table.rows.last_mut() {
                            row.spans |= tag.attr("colSpan").is_some();
                            row.cells.push(Cell {
                                width: tag.attr_i32("width"),
                                boxes: Vec::new(),
                            });
                        }
                    }
                    _ => {
                        let cell = table.rows.last_mut().and_then(|r| r.cells.last_mut());
                        if let (Some(cell), Some(bbox)) = (cell, tag.ltrb()) {
                            cell.boxes.push(bbox);
                        }
                    }
                }
            }
            Node::Close("block") => {
                if let Some(table) = current.take() {
                    tables.push(table);
                }
            }
            _ => {}
        }
    }
    if let Some(table) = current {
        tables.push(table);
    }
    tables
}

/// Column edges from declared cell widths.
///
/// Returns `None` when a width is missing.
fn declared_columns(table: &BBox, row: &Row) -> Option<Vec<(i32, i32)>> {
    let mut left = table.left;
    row.cells
        .iter()
        .map(|cell| {
            let right = left + cell.width?;
            let column = (left, right);
            left = right;
            Some(column)
        })
        .collect()
}

/// Column edges from the boxes found in each cell of every row.
fn measured_columns(table: &BBox, rows: &[Row]) -> Vec<(i32, i32)> {
    let mut lefts: Vec<Option<Vec<i32>>> = Vec::new();
    let mut rights: Vec<Vec<i32>> = Vec::new();

    for row in rows {
        for (k, cell) in row.cells.iter().enumerate() {
            let (Some(l), Some(r)) = (
                cell.boxes.iter().map(|b| b.left).min(),
                cell.boxes.iter().map(|b| b.right).max(),
            ) else {
                continue;
            };
            if lefts.len() <= k {
                lefts.resize(k + 1, None);
                rights.resize(k + 1, Vec::new());
            }
            lefts[k].get_or_insert_with(Vec::new).push(l);
            rights[k].push(r);
        }
    }

    // drop columns with no data at all
    let (lefts, rights): (Vec<Vec<i32>>, Vec<Vec<i32>>) = lefts
        .into_iter()
        .zip(rights)
        .filter_map(|(l, r)| l.map(|l| (l, r)))
        .unzip();

    let left_min: Vec<i32> = lefts
        .iter()
        .map(|l| l.iter().copied().min().unwrap_or(table.left))
        .collect();

    // right edges past the next column's left edge belong to spanning cells
    let right_max: Vec<Option<i32>> = rights
        .iter()
        .enumerate()
        .map(|(j, r)| match left_min.get(j + 1) {
            Some(next) => r.iter().copied().filter(|x| x < next).max(),
            None => r.iter().copied().max(),
        })
        .collect();

    let n = left_min.len();
    (0..n)
        .map(|j| {
            let left = if j == 0 {
                table.left
            } else {
                match right_max[j - 1] {
                    Some(prev) => midpoint(left_min[j], prev),
                    None => left_min[j],
                }
            };
            let right = if j + 1 == n {
                table.right
            } else {
                match right_max[j] {
                    Some(r) => midpoint(left_min[j + 1], r),
                    None => left_min[j + 1],
                }
            };
            (left, right)
        })
        .collect()
}

fn midpoint(a: i32, b: i32) -> i32 {
    round_half_up((a + b) as f64 / 2.0) as i32
}

/// Detect table columns on an ABBYY page.
///
/// Box priorities continue across all tables of the page; each box records
/// the index of its table.
pub fn convert_table_layout(markup: &str) -> LayoutBoxes {
    let mut boxes = LayoutBoxes::new();

    for (index, table) in scan_tables(markup).into_iter().enumerate() {
        let row = match table.rows.as_slice() {
            [first, second, ..] if first.spans => Some(second),
            [first, ..] => Some(first),
            [] => None,
        };
        let (Some(coords), Some(row)) = (table.coords, row.filter(|r| !r.cells.is_empty())) else {
            log::warn!("Failed to parse table {}", index);
            continue;
        };

        let columns = match declared_columns(&coords, row) {
            Some(cols) if cols.last().is_some_and(|c| (c.1 - coords.right).abs() <= WIDTH_TOLERANCE) => {
                cols
            }
            declared => {
                let declared_right = declared.and_then(|c| c.last().map(|c| c.1));
                log::info!(
                    "Table width does not match sum of columns ({} vs {:?}), using column contents",
                    coords.right,
                    declared_right
                );
                measured_columns(&coords, &table.rows)
            }
        };

        for (left, right) in columns {
            let priority = boxes.len() + 1;
            let id = Uuid::new_v4().simple().to_string();
            boxes.insert(
                id,
                LayoutBox::data_column(priority, BBox::new(left, coords.top, right, coords.bottom), index),
            );
        }
    }

    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayoutBoxType;

    fn cell(width: i32, l: i32, r: i32) -> String {
        format!(
            r#"<cell width="{width}"><text><par><line baseline="10" l="{l}" t="10" r="{r}" b="20"><formatting><charParams l="{l}" t="10" r="{r}" b="20">x</charParams></formatting></line></par></text></cell>"#
        )
    }

    fn table(widths: [i32; 3]) -> String {
        format!(
            r#"<page><block blockType="Table" l="100" t="50" r="400" b="300"><row>{}{}{}</row><row>{}{}{}</row></block></page>"#,
            cell(widths[0], 110, 180),
            cell(widths[1], 210, 280),
            cell(widths[2], 310, 390),
            cell(widths[0], 105, 190),
            cell(widths[1], 205, 290),
            cell(widths[2], 305, 395),
        )
    }

    #[test]
    fn test_declared_widths() {
        let boxes = convert_table_layout(&table([100, 100, 100]));
        let coords: Vec<BBox> = boxes.values().map(|b| b.coords).collect();
        assert_eq!(
            coords,
            vec![
                BBox::new(100, 50, 200, 300),
                BBox::new(200, 50, 300, 300),
                BBox::new(300, 50, 400, 300),
            ]
        );
        let priorities: Vec<usize> = boxes.values().map(|b| b.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
        assert!(boxes.values().all(|b| b.kind == LayoutBoxType::DataColumn && b.table == Some(0)));
        assert!(boxes.keys().all(|id| id.len() == 32));
    }

    #[test]
    fn test_fallback_when_widths_disagree() {
        let boxes = convert_table_layout(&table([50, 50, 50]));
        let coords: Vec<BBox> = boxes.values().map(|b| b.coords).collect();
        assert_eq!(
            coords,
            vec![
                BBox::new(100, 50, 198, 300),
                BBox::new(198, 50, 298, 300),
                BBox::new(298, 50, 400, 300),
            ]
        );
    }

    #[test]
    fn test_spanning_first_row_uses_second() {
        let markup = format!(
            r#"<block blockType="Table" l="0" t="0" r="200" b="100"><row><cell width="200" colSpan="2"></cell></row><row>{}{}</row></block>"#,
            cell(100, 10, 90),
            cell(100, 110, 190),
        );
        let boxes = convert_table_layout(&markup);
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn test_malformed_table_skipped() {
        let markup = r#"<block blockType="Table"><row><cell width="10"></cell></row></block>
            <block blockType="Table" l="0" t="0" r="100" b="10"></block>"#;
        assert!(convert_table_layout(markup).is_empty());
        assert!(convert_table_layout("<page></page>").is_empty());
    }

    #[test]
    fn test_priorities_continue_across_tables() {
        let markup = format!("{}{}", table([100, 100, 100]), table([100, 100, 100]));
        let boxes = convert_table_layout(&markup);
        let tables: Vec<Option<usize>> = boxes.values().map(|b| b.table).collect();
        assert_eq!(tables, vec![Some(0), Some(0), Some(0), Some(1), Some(1), Some(1)]);
        assert_eq!(boxes.values().last().map(|b| b.priority), Some(6));
    }
}
