//! Header row heuristics.
//!
//! - Span based: rows with the longest run of consecutive filled cells start islands.
//! - Type homogeneity: a row is confirmed as header when the rows under it agree on cell
//!   types column by column.
//! - True header: the last text-only row right above the first row holding numbers.
use crate::model::column::ColumnDescriptor;
use crate::model::region::Region;
use crate::spreadsheet::cell::classify;
use crate::spreadsheet::cell::classify_column;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::is_blank;
use crate::spreadsheet::is_blank_row;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq)]
pub enum HeaderError {
    #[error("Cannot locate a header in an empty subgrid")]
    EmptySubgrid,
}

/// Longest run of consecutive non-blank cells as (start column, length).
///
/// Runs shorter than two cells do not describe a table and report a length of 0.
pub fn longest_span(row: &[String]) -> (usize, usize) {
    let mut best = (0, 0);
    let mut start = 0;
    let mut length = 0;
    for (col, value) in row.iter().enumerate() {
        if is_blank(value) {
            length = 0;
        } else {
            if length == 0 {
                start = col;
            }
            length += 1;
            if length > best.1 {
                best = (start, length);
            }
        }
    }
    if best.1 < 2 {
        (0, 0)
    } else {
        best
    }
}

/// Grid-wide maximum span and the rows achieving it, in scan order.
pub fn span_header_candidates(grid: &[Vec<String>]) -> (usize, Vec<usize>) {
    let spans: Vec<usize> = grid.iter().map(|row| longest_span(row).1).collect();
    let max_span = spans.iter().copied().max().unwrap_or(0);
    if max_span == 0 {
        return (0, Vec::new());
    }
    let candidates = spans
        .iter()
        .enumerate()
        .filter(|(_, span)| **span == max_span)
        .map(|(row, _)| row)
        .collect();
    (max_span, candidates)
}

/// Result of the type-homogeneity header search.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderMatch {
    Found {
        row: usize,
        columns: Vec<ColumnDescriptor>,
    },
    NotFound,
}

impl HeaderMatch {
    /// Header row index, -1 when no header was found.
    pub fn index(&self) -> i64 {
        match self {
            HeaderMatch::Found { row, .. } => *row as i64,
            HeaderMatch::NotFound => -1,
        }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        match self {
            HeaderMatch::Found { columns, .. } => columns,
            HeaderMatch::NotFound => &[],
        }
    }
}

fn cell_type(grid: &[Vec<String>], row: usize, col: usize) -> CellType {
    grid.get(row)
        .and_then(|cells| cells.get(col))
        .map(|value| classify(value))
        .unwrap_or(CellType::Empty)
}

/// Searches `region` for a header row, starting at `candidate` and moving down.
///
/// A row qualifies when it is not blank, holds no number, and at least the configured
/// share of the region's columns keep one cell type across the next rows below it.
pub fn locate_header(grid: &[Vec<String>], region: &Region, candidate: usize, criteria: &Criteria) -> HeaderMatch {
    let mut row = candidate.max(region.row_lower_bound);
    let mut iterations = 0;
    while row <= region.row_upper_bound && iterations < criteria.header_iteration_cap {
        iterations += 1;
        let compared = (region.row_upper_bound - row).min(criteria.header_sample_rows);
        let cols = region.col_lower_bound..=region.col_upper_bound;
        let is_text_row = cols.clone().any(|col| cell_type(grid, row, col) != CellType::Empty)
            && cols.clone().all(|col| cell_type(grid, row, col) != CellType::Number);
        if compared > 0 && is_text_row {
            let agreeing = cols
                .clone()
                .filter(|col| {
                    let first = cell_type(grid, row + 1, *col);
                    (row + 2..=row + compared).all(|below| cell_type(grid, below, *col) == first)
                })
                .count();
            if agreeing as f64 >= criteria.header_agreement_ratio * region.cols() as f64 {
                return HeaderMatch::Found {
                    row,
                    columns: describe_columns(grid, region, row),
                };
            }
        }
        row += 1;
    }
    debug!(%region, candidate, iterations, "No header row found");
    HeaderMatch::NotFound
}

fn describe_columns(grid: &[Vec<String>], region: &Region, header: usize) -> Vec<ColumnDescriptor> {
    let value = |row: usize, col: usize| {
        grid.get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
            .unwrap_or("")
    };
    (region.col_lower_bound..=region.col_upper_bound)
        .map(|col| ColumnDescriptor {
            name: value(header, col).trim().to_owned(),
            inferred_type: classify_column((header + 1..=region.row_upper_bound).map(|row| value(row, col))),
            region: Region {
                row_lower_bound: header + 1,
                col_lower_bound: col,
                row_upper_bound: region.row_upper_bound,
                col_upper_bound: col,
            },
        })
        .collect()
}

/// Finds the true header of an island: the first non-blank row without numbers whose
/// successor holds at least one number. None when no such transition exists.
pub fn find_true_header(rows: &[Vec<String>]) -> Result<Option<usize>, HeaderError> {
    if rows.is_empty() {
        Err(HeaderError::EmptySubgrid)?
    }
    let has_number = |row: &[String]| row.iter().any(|value| classify(value) == CellType::Number);
    let header = rows
        .windows(2)
        .enumerate()
        .find(|(_, pair)| !is_blank_row(&pair[0]) && !has_number(&pair[0][..]) && has_number(&pair[1][..]))
        .map(|(index, _)| index);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::region::parse_region;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect()
    }

    #[test]
    fn span_of_row() {
        assert_eq!(longest_span(&grid(&[&["a", "b", "", "c", "d", "e"]])[0]), (3, 3));
        assert_eq!(longest_span(&grid(&[&["", "a", "b"]])[0]), (1, 2));
        assert_eq!(longest_span(&grid(&[&["a", "", "b"]])[0]), (0, 0));
        assert_eq!(longest_span(&grid(&[&[]])[0]), (0, 0));
    }

    #[test]
    fn span_candidates_in_scan_order() {
        let grid = grid(&[
            &["Report", "", ""],
            &["a", "b", "c"],
            &["1", "2", ""],
            &["x", "y", "z"],
        ]);
        assert_eq!(span_header_candidates(&grid), (3, vec![1, 3]));
        assert_eq!(span_header_candidates(&[]), (0, vec![]));
    }

    #[test]
    fn locate_header_with_homogeneous_data() {
        let grid = grid(&[
            &["Quarterly report", "", ""],
            &["Date", "Amount", "Note"],
            &["2024-01-01", "100", "ok"],
            &["2024-01-02", "-50", "late"],
            &["2024-01-03", "75", "ok"],
        ]);
        let region = parse_region("A1:C5").unwrap();
        let header = locate_header(&grid, &region, 0, &Criteria::default());
        assert_eq!(header.index(), 1);
        let columns = header.columns();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "Date");
        assert_eq!(columns[0].inferred_type, CellType::Date);
        assert_eq!(columns[0].region.to_string(), "A3:A5");
        assert_eq!(columns[1].inferred_type, CellType::Number);
        assert_eq!(columns[2].inferred_type, CellType::String);
    }

    #[test]
    fn locate_header_skips_numeric_rows() {
        let grid = grid(&[
            &["1", "2"],
            &["Name", "Score"],
            &["Ann", "3"],
            &["Bob", "4"],
        ]);
        let region = parse_region("A1:B4").unwrap();
        assert_eq!(locate_header(&grid, &region, 0, &Criteria::default()).index(), 1);
    }

    #[test]
    fn locate_header_not_found() {
        let grid = grid(&[
            &["Name", "Score"],
            &["Ann", "3"],
            &["12", "x"],
            &["Bob", "2024-01-01"],
        ]);
        let region = parse_region("A1:B4").unwrap();
        let header = locate_header(&grid, &region, 0, &Criteria::default());
        assert_eq!(header, HeaderMatch::NotFound);
        assert_eq!(header.index(), -1);
        assert!(header.columns().is_empty());
    }

    #[test]
    fn locate_header_respects_iteration_cap() {
        let grid = grid(&[
            &["x", "y"],
            &["1", "a"],
            &["b", "2"],
            &["Name", "Score"],
            &["Ann", "3"],
            &["Bob", "4"],
        ]);
        let region = parse_region("A1:B6").unwrap();
        assert_eq!(locate_header(&grid, &region, 0, &Criteria::default()).index(), 3);
        let criteria = Criteria {
            header_iteration_cap: 2,
            ..Criteria::default()
        };
        assert_eq!(locate_header(&grid, &region, 0, &criteria), HeaderMatch::NotFound);
    }

    #[test]
    fn true_header_transition() {
        let rows = grid(&[
            &["Sales", ""],
            &["", ""],
            &["Date", "Amount"],
            &["2024-01-01", "100"],
        ]);
        assert_eq!(find_true_header(&rows), Ok(Some(2)));
    }

    #[test]
    fn true_header_missing() {
        let rows = grid(&[&["a", "b"], &["c", "d"]]);
        assert_eq!(find_true_header(&rows), Ok(None));
        assert_eq!(find_true_header(&grid(&[&["Date"]])), Ok(None));
        assert_eq!(find_true_header(&[]), Err(HeaderError::EmptySubgrid));
    }
}
