//! # Island Segmentation
//!
//! Splits a grid into rectangular tables ("islands") and the free-form metadata rows
//! around them.
//!
//! 1. Rows achieving the grid-wide longest filled span are island candidates.
//! 2. A candidate's span fixes the island columns; the island grows downward over rows
//!    filled enough within those columns and stops after a run of sparse rows.
//! 3. Rows strictly before or between islands become metadata when the gap is wider
//!    than a single separator row.
//! 4. Each island is trimmed to its true header.
use crate::detection::header::find_true_header;
use crate::detection::header::longest_span;
use crate::detection::header::span_header_candidates;
use crate::error::DetectionError;
use crate::error::ResultMessage;
use crate::model::region::Region;
use crate::model::table::MetadataBlock;
use crate::model::table::Table;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::grid_width;
use crate::spreadsheet::is_blank;
use crate::spreadsheet::is_blank_row;
use tracing::debug;

/// A contiguous rectangular block of the grid inferred to be one table.
#[derive(Clone, Debug, PartialEq)]
pub struct Island {
    /// Grid row of the header, None when no header was recognized
    pub header_row: Option<usize>,
    pub header: Option<Vec<String>>,
    /// Data rows below the header, restricted to the island columns
    pub rows: Vec<Vec<String>>,
    pub region: Region,
}

impl From<Island> for Table {
    fn from(island: Island) -> Self {
        Table {
            header: island.header,
            rows: island.rows,
            region: island.region,
        }
    }
}

/// Islands in grid order plus the metadata blocks found before and between them.
#[derive(Clone, Debug, PartialEq)]
pub struct Segmentation {
    pub islands: Vec<Island>,
    pub metadata: Vec<MetadataBlock>,
}

/// Island rows before header trimming.
struct Block {
    col_lower_bound: usize,
    col_upper_bound: usize,
    /// Grid rows included in the island, ascending
    rows: Vec<usize>,
}

impl Block {
    fn first_row(&self) -> usize {
        self.rows[0]
    }

    fn last_row(&self) -> usize {
        self.rows[self.rows.len() - 1]
    }
}

fn fill_ratio(row: &[String], col_lower_bound: usize, col_upper_bound: usize) -> f64 {
    let width = col_upper_bound - col_lower_bound + 1;
    let filled = (col_lower_bound..=col_upper_bound)
        .filter(|col| row.get(*col).map(|value| !is_blank(value)).unwrap_or(false))
        .count();
    filled as f64 / width as f64
}

/// Grows an island downward from its header candidate.
fn grow(grid: &[Vec<String>], start: usize, consumed: &[bool], criteria: &Criteria) -> Block {
    let (col_lower_bound, span) = longest_span(&grid[start]);
    let col_upper_bound = col_lower_bound + span - 1;
    let mut rows = vec![start];
    let mut consecutive_sparse = 0;
    for row in (start + 1)..grid.len() {
        if consumed[row] {
            continue;
        }
        if fill_ratio(&grid[row], col_lower_bound, col_upper_bound) < criteria.sparse_row_ratio {
            consecutive_sparse += 1;
            if consecutive_sparse >= criteria.max_consecutive_sparse_rows {
                break;
            }
        } else {
            consecutive_sparse = 0;
            rows.push(row);
        }
    }
    Block {
        col_lower_bound,
        col_upper_bound,
        rows,
    }
}

/// Cuts the island columns out of a grid row, padding short rows with blanks.
fn slice_row(row: &[String], col_lower_bound: usize, col_upper_bound: usize) -> Vec<String> {
    (col_lower_bound..=col_upper_bound)
        .map(|col| row.get(col).cloned().unwrap_or_default())
        .collect()
}

/// Applies the true-header finder to a block and builds the island.
fn to_island(grid: &[Vec<String>], block: &Block) -> Result<Island, DetectionError> {
    let mut rows: Vec<Vec<String>> = block
        .rows
        .iter()
        .map(|row| slice_row(&grid[*row], block.col_lower_bound, block.col_upper_bound))
        .collect();
    let header = find_true_header(&rows)?;
    let (header_row, header, first_row) = match header {
        Some(index) => {
            if index > 0 {
                debug!(dropped = index, row = block.rows[index], "Trimmed rows above true header");
            }
            let data = rows.split_off(index + 1);
            let header = rows.pop();
            rows = data;
            (Some(block.rows[index]), header, block.rows[index])
        }
        None => (None, None, block.first_row()),
    };
    Ok(Island {
        header_row,
        header,
        rows,
        region: Region {
            row_lower_bound: first_row,
            col_lower_bound: block.col_lower_bound,
            row_upper_bound: block.last_row(),
            col_upper_bound: block.col_upper_bound,
        },
    })
}

fn metadata_between(grid: &[Vec<String>], lower: usize, upper: usize, width: usize) -> Option<MetadataBlock> {
    // A single separator row is not metadata
    if upper <= lower + 1 {
        return None;
    }
    let rows: Vec<Vec<String>> = grid[lower..upper]
        .iter()
        .filter(|row| !is_blank_row(row))
        .cloned()
        .collect();
    if rows.is_empty() {
        return None;
    }
    debug!(from = lower, to = upper - 1, rows = rows.len(), "Captured metadata block");
    Some(MetadataBlock {
        rows,
        region: Region {
            row_lower_bound: lower,
            col_lower_bound: 0,
            row_upper_bound: upper - 1,
            col_upper_bound: width.saturating_sub(1),
        },
    })
}

/// Partitions `grid` into islands and metadata blocks.
///
/// A grid in which no row has two adjacent filled cells comes back whole as a single
/// headerless island. An empty grid is an error.
pub fn segment(grid: &[Vec<String>], criteria: &Criteria) -> Result<Segmentation, DetectionError> {
    if grid.is_empty() {
        Err(DetectionError::NoStructuredTableFound)?
    }
    let width = grid_width(grid);
    let (max_span, candidates) = span_header_candidates(grid);
    if max_span == 0 {
        debug!(rows = grid.len(), "No filled span, keeping the whole grid as one island");
        return Ok(Segmentation {
            islands: vec![Island {
                header_row: None,
                header: None,
                rows: grid.to_vec(),
                region: Region::covering(grid.len(), width),
            }],
            metadata: Vec::new(),
        });
    }

    let mut consumed = vec![false; grid.len()];
    let mut blocks: Vec<Block> = Vec::new();
    for candidate in candidates {
        if consumed[candidate] {
            continue;
        }
        let block = grow(grid, candidate, &consumed, criteria);
        // Sparse rows skipped while growing stay free to seed another island
        for row in &block.rows {
            consumed[*row] = true;
        }
        debug!(
            first_row = block.first_row(),
            last_row = block.last_row(),
            cols = block.col_upper_bound - block.col_lower_bound + 1,
            "Found island"
        );
        blocks.push(block);
    }
    blocks.sort_by_key(Block::first_row);

    let mut islands = Vec::with_capacity(blocks.len());
    let mut metadata = Vec::new();
    let mut next_free_row = 0;
    for (index, block) in blocks.iter().enumerate() {
        if let Some(block) = metadata_between(grid, next_free_row, block.first_row(), width) {
            metadata.push(block);
        }
        next_free_row = next_free_row.max(block.last_row() + 1);
        islands.push(to_island(grid, block).with_prefix(&format!("island {}", index + 1))?);
    }

    if islands.is_empty() {
        Err(DetectionError::NoStructuredTableFound)?
    }
    Ok(Segmentation { islands, metadata })
}
