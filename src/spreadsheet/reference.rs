//! Excel-style addressing: bijective base-26 column letters and A1 cell references.
//!
//! Column letters are 1-based (`A` = 1, `Z` = 26, `AA` = 27). Row and column indexes
//! used everywhere else in the crate are 0-based; the `*_to_index` helpers bridge both.
use thiserror::Error;

/// Errors related to column letter conversion.
#[derive(Error, Debug, PartialEq)]
pub enum ReferenceError {
    #[error("Invalid column letters '{0}'")]
    InvalidColumn(String),

    #[error("Column index must be positive, got {0}")]
    NonPositiveIndex(usize),
}

/// Converts column letters to a 1-based column number (`"A"` -> 1, `"AA"` -> 27).
pub fn letter_to_index(letters: &str) -> Result<usize, ReferenceError> {
    if letters.is_empty() {
        Err(ReferenceError::InvalidColumn(letters.to_owned()))?
    }
    let mut index: usize = 0;
    for char in letters.chars() {
        if !char.is_ascii_alphabetic() {
            Err(ReferenceError::InvalidColumn(letters.to_owned()))?
        }
        let digit = (char.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index
            .checked_mul(26)
            .and_then(|index| index.checked_add(digit))
            .ok_or_else(|| ReferenceError::InvalidColumn(letters.to_owned()))?;
    }
    Ok(index)
}

/// Converts a 1-based column number to upper-case column letters (27 -> `"AA"`).
pub fn index_to_letter(index: usize) -> Result<String, ReferenceError> {
    if index == 0 {
        Err(ReferenceError::NonPositiveIndex(index))?
    }
    let mut column = index;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.reverse();
    Ok(letters.into_iter().map(char::from).collect())
}

/// Advances column letters by `n` columns, rolling over as needed (`"Z"` + 1 -> `"AA"`).
pub fn increment_column(letters: &str, n: usize) -> Result<String, ReferenceError> {
    let index = letter_to_index(letters)?;
    let target = index
        .checked_add(n)
        .ok_or_else(|| ReferenceError::InvalidColumn(letters.to_owned()))?;
    index_to_letter(target)
}

/// Converts column letters to a 0-based column index. Returns None for blank or invalid input.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    letter_to_index(letters).ok().map(|index| index - 1)
}

/// Converts a 1-based row number string to a 0-based row index. Row "0" is rejected.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .map(|row| row - 1)
}

/// Converts 0-based row and column indexes to an A1 reference (e.g. (0, 0) -> "A1").
pub fn index_to_reference(row: usize, col: usize) -> String {
    // col + 1 is always positive
    let letters = index_to_letter(col + 1).unwrap_or_default();
    format!("{}{}", letters, row + 1)
}

/// Parses an A1 reference into 0-based (row, col) indexes.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|char: char| char.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = col_to_index(letters)?;
    let row = row_to_index(digits)?;
    Some((row, col))
}
