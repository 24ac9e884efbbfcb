use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::fill_count;
use crate::spreadsheet::is_blank;
use crate::spreadsheet::Grid;
use tracing::trace;

/// Rows after wrap repair, with the source row span each output row came from.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedRows {
    pub rows: Grid,
    /// Inclusive (first, last) source row index per output row
    pub sources: Vec<(usize, usize)>,
}

/// Fuses `upper` and `lower` if they look like one record split over two lines.
///
/// Rejected when any column holds different non-blank values in both rows, or when the
/// merged row does not add information over each source row.
pub fn try_merge(upper: &[String], lower: &[String], criteria: &Criteria) -> Option<Vec<String>> {
    let width = upper.len().max(lower.len());
    let cell = |row: &[String], col: usize| row.get(col).filter(|value| !is_blank(value)).cloned();

    let mut merged = Vec::with_capacity(width);
    for col in 0..width {
        match (cell(upper, col), cell(lower, col)) {
            (Some(above), Some(below)) if above != below => return None,
            (Some(value), _) | (None, Some(value)) => merged.push(value),
            (None, None) => merged.push(String::new()),
        }
    }

    let fill_before = fill_count(upper);
    let fill_after = fill_count(lower);
    let fill_merged = fill_count(&merged);
    let keeps_enough = fill_merged as f64 >= criteria.wrap_fill_ratio * (fill_before + fill_after) as f64;
    if keeps_enough && fill_merged > fill_before && fill_merged > fill_after {
        Some(merged)
    } else {
        None
    }
}

/// Single left-to-right pass merging adjacent wrapped rows; merges never overlap.
pub fn merge_wrapped_rows(grid: &[Vec<String>], criteria: &Criteria) -> WrappedRows {
    let mut rows = Vec::with_capacity(grid.len());
    let mut sources = Vec::with_capacity(grid.len());
    let mut index = 0;
    while index < grid.len() {
        let merged = grid
            .get(index + 1)
            .and_then(|lower| try_merge(&grid[index], lower, criteria));
        match merged {
            Some(row) => {
                trace!(row = index, "Merged wrapped row with its successor");
                rows.push(row);
                sources.push((index, index + 1));
                index += 2;
            }
            None => {
                rows.push(grid[index].to_owned());
                sources.push((index, index));
                index += 1;
            }
        }
    }
    WrappedRows { rows, sources }
}
