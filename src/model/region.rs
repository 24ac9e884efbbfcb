use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::row_to_index;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde::Serializer;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to Excel-style region parsing.
#[derive(Error, Debug, PartialEq)]
pub enum RegionError {
    #[error("Invalid region '{0}'")]
    InvalidRegion(String),
}

static REGION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z]+)(\d+):([A-Z]+)(\d+)$").expect("Hardcode regex pattern")
});

/// Inclusive rectangular cell span such as `A1:C10`, stored with 0-based bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub row_lower_bound: usize,
    pub col_lower_bound: usize,
    pub row_upper_bound: usize,
    pub col_upper_bound: usize,
}

impl Region {
    /// Creates a region from 0-based inclusive bounds, rejecting inverted spans.
    pub fn new(
        row_lower_bound: usize,
        col_lower_bound: usize,
        row_upper_bound: usize,
        col_upper_bound: usize,
    ) -> Result<Self, RegionError> {
        let region = Region {
            row_lower_bound,
            col_lower_bound,
            row_upper_bound,
            col_upper_bound,
        };
        if row_lower_bound > row_upper_bound || col_lower_bound > col_upper_bound {
            Err(RegionError::InvalidRegion(format!(
                "{}:{}",
                index_to_reference(row_lower_bound, col_lower_bound),
                index_to_reference(row_upper_bound, col_upper_bound)
            )))
        } else {
            Ok(region)
        }
    }

    /// Region covering a whole `rows` x `cols` grid. Degenerate grids collapse to `A1:A1`.
    pub fn covering(rows: usize, cols: usize) -> Self {
        Region {
            row_lower_bound: 0,
            col_lower_bound: 0,
            row_upper_bound: rows.saturating_sub(1),
            col_upper_bound: cols.saturating_sub(1),
        }
    }

    /// Number of rows spanned.
    pub fn rows(&self) -> usize {
        self.row_upper_bound - self.row_lower_bound + 1
    }

    /// Number of columns spanned.
    pub fn cols(&self) -> usize {
        self.col_upper_bound - self.col_lower_bound + 1
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row_lower_bound <= row
            && row <= self.row_upper_bound
            && self.col_lower_bound <= col
            && col <= self.col_upper_bound
    }

    /// Smallest region covering both regions.
    pub fn union(&self, other: &Region) -> Region {
        Region {
            row_lower_bound: self.row_lower_bound.min(other.row_lower_bound),
            col_lower_bound: self.col_lower_bound.min(other.col_lower_bound),
            row_upper_bound: self.row_upper_bound.max(other.row_upper_bound),
            col_upper_bound: self.col_upper_bound.max(other.col_upper_bound),
        }
    }
}

/// Parses an `A1:C10` region string. Malformed input is reported, never guessed.
pub fn parse_region(value: &str) -> Result<Region, RegionError> {
    let value = value.trim().to_ascii_uppercase();
    let invalid = || RegionError::InvalidRegion(value.to_owned());
    let captures = REGION_PATTERN.captures(value.as_str()).ok_or_else(invalid)?;
    let bound = |index: usize, convert: fn(&str) -> Option<usize>| {
        captures
            .get(index)
            .map(|matcher| matcher.as_str())
            .and_then(convert)
            .ok_or_else(invalid)
    };
    let col_lower_bound = bound(1, col_to_index)?;
    let row_lower_bound = bound(2, row_to_index)?;
    let col_upper_bound = bound(3, col_to_index)?;
    let row_upper_bound = bound(4, row_to_index)?;
    Region::new(row_lower_bound, col_lower_bound, row_upper_bound, col_upper_bound)
        .map_err(|_| invalid())
}

impl TryFrom<&str> for Region {
    type Error = RegionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse_region(value)
    }
}

impl FromStr for Region {
    type Err = RegionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_region(value)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            index_to_reference(self.row_lower_bound, self.col_lower_bound),
            index_to_reference(self.row_upper_bound, self.col_upper_bound)
        )
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
