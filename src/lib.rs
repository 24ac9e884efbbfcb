//! # Tabular Islands
//!
//! Structural inference over raw spreadsheet grids: finds the table hidden in a sheet,
//! its header row, and the free-form metadata rows around it.
//!
//! ## Pipeline
//!
//! - **Row-wrap repair**: fuses physical rows holding fragments of one logical record
//! - **Island segmentation**: splits the grid into rectangular tables and metadata gaps,
//!   seeded by the rows with the longest run of filled cells
//! - **True-header trimming**: drops label rows above the row that introduces numeric data
//! - **Table merging**: keeps the largest group of tables sharing an identical header and
//!   deduplicates the metadata rows
//!
//! Cell-level helpers (Excel addressing, cell type classification, date format inference
//! and the type-homogeneity header check) are exported for callers validating a column
//! mapping proposed elsewhere.
//!
//! ## Example
//!
//! ```
//! use tabular_islands::{detect_table, Criteria};
//!
//! let grid: Vec<Vec<String>> = [
//!     ["Date", "Amount"],
//!     ["2024-01-01", "100"],
//!     ["2024-01-02", "-50"],
//! ]
//! .iter()
//! .map(|row| row.iter().map(|cell| cell.to_string()).collect())
//! .collect();
//!
//! let detection = detect_table(&grid, &Criteria::default()).unwrap();
//! assert_eq!(detection.table.region.to_string(), "A1:B3");
//! assert_eq!(detection.table.rows.len(), 2);
//! ```
pub mod detection;
pub mod error;
pub mod model;
pub mod spreadsheet;

pub use crate::detection::header::locate_header;
pub use crate::detection::header::HeaderMatch;
pub use crate::error::DetectionError;
pub use crate::model::column::ColumnDescriptor;
pub use crate::model::column::ColumnMapping;
pub use crate::model::region::parse_region;
pub use crate::model::region::Region;
pub use crate::model::table::MetadataBlock;
pub use crate::model::table::Table;
pub use crate::spreadsheet::cell::classify;
pub use crate::spreadsheet::cell::CellType;
pub use crate::spreadsheet::criteria::Criteria;
pub use crate::spreadsheet::date_format::detect_date_format;
pub use crate::spreadsheet::date_format::region_is_all_valid_dates;

use crate::detection::island::segment;
use crate::detection::merge::merge_metadata;
use crate::detection::merge::merge_tables;
use crate::detection::wrap::merge_wrapped_rows;
use crate::spreadsheet::normalize_grid;
use serde::Serialize;
use tracing::debug;

/// Outcome of a detection pass: the representative table and the metadata around it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub table: Table,
    pub metadata: Option<MetadataBlock>,
}

/// Maps a region over wrap-repaired rows back to the rows of the input grid.
fn to_source_region(region: Region, sources: &[(usize, usize)]) -> Region {
    let first = sources.get(region.row_lower_bound).map(|span| span.0);
    let last = sources.get(region.row_upper_bound).map(|span| span.1);
    Region {
        row_lower_bound: first.unwrap_or(region.row_lower_bound),
        row_upper_bound: last.unwrap_or(region.row_upper_bound),
        ..region
    }
}

/// Detects the main table of `grid` and the metadata rows surrounding it.
///
/// Regions in the result refer to the rows and columns of `grid` as given, before any
/// wrapped rows were fused.
///
/// # Errors
///
/// Returns [`DetectionError::NoStructuredTableFound`] when the grid has no rows.
pub fn detect_table(grid: &[Vec<String>], criteria: &Criteria) -> Result<Detection, DetectionError> {
    let grid = normalize_grid(grid);
    let wrapped = merge_wrapped_rows(&grid, criteria);
    if wrapped.rows.len() < grid.len() {
        debug!(before = grid.len(), after = wrapped.rows.len(), "Repaired wrapped rows");
    }

    let segmentation = segment(&wrapped.rows, criteria)?;
    let tables = segmentation
        .islands
        .into_iter()
        .map(|island| {
            let mut table = Table::from(island);
            table.region = to_source_region(table.region, &wrapped.sources);
            table
        })
        .collect();
    let metadata = segmentation
        .metadata
        .into_iter()
        .map(|mut block| {
            block.region = to_source_region(block.region, &wrapped.sources);
            block
        })
        .collect();

    let table = merge_tables(tables).ok_or(DetectionError::NoStructuredTableFound)?;
    Ok(Detection {
        table,
        metadata: merge_metadata(metadata),
    })
}
