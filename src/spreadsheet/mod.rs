//! # Cell-Level Inference
//!
//! Excel addressing, cell type classification and date format inference over raw cell
//! text. A grid is a list of rows of strings as produced by an upstream decoder; blank
//! cells are empty or whitespace-only strings.
pub mod cell;
pub mod criteria;
pub mod date_format;
pub(crate) mod datetime;
pub mod reference;

/// Raw two-dimensional grid of cell text.
pub type Grid = Vec<Vec<String>>;

/// Returns true for empty or whitespace-only cell text.
#[inline]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Number of non-blank cells in a row.
pub fn fill_count(row: &[String]) -> usize {
    row.iter().filter(|value| !is_blank(value)).count()
}

/// Returns true if every cell of the row is blank.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|value| is_blank(value))
}

/// Width of the widest row.
pub fn grid_width(grid: &[Vec<String>]) -> usize {
    grid.iter().map(Vec::len).max().unwrap_or(0)
}

/// Normalizes blank cells to empty strings and pads ragged rows to the grid width.
pub fn normalize_grid(grid: &[Vec<String>]) -> Grid {
    let width = grid_width(grid);
    grid.iter()
        .map(|row| {
            let mut row: Vec<String> = row
                .iter()
                .map(|value| if is_blank(value) { String::new() } else { value.to_owned() })
                .collect();
            row.resize(width, String::new());
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_pads_and_blanks() {
        let grid = vec![
            vec!["a".to_owned(), "  ".to_owned()],
            vec!["b".to_owned()],
            vec![],
        ];
        let normalized = normalize_grid(&grid);
        assert_eq!(normalized, vec![
            vec!["a".to_owned(), "".to_owned()],
            vec!["b".to_owned(), "".to_owned()],
            vec!["".to_owned(), "".to_owned()],
        ]);
    }

    #[test]
    fn row_helpers() {
        let row = vec!["x".to_owned(), " ".to_owned(), "y".to_owned()];
        assert_eq!(fill_count(&row), 2);
        assert!(!is_blank_row(&row));
        assert!(is_blank_row(&["".to_owned(), "\t".to_owned()]));
        assert!(is_blank_row(&[]));
        assert_eq!(grid_width(&[]), 0);
    }
}
