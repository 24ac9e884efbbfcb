use crate::spreadsheet::datetime;
use crate::spreadsheet::is_blank;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$").expect("Hardcode regex pattern")
});

/// Types of cell content inferred from raw text. Derived on demand, never stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    #[default]
    Empty,
    /// Signed decimal numbers, optionally with exponent and thousands separators
    Number,
    /// Anything the lenient date parser accepts
    Date,
    /// Fallback for all other non-blank text
    String,
}

impl CellType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CellType::Empty => "empty",
            CellType::Number => "number",
            CellType::Date => "date",
            CellType::String => "string",
        }
    }
}

/// Classifies a raw cell value.
///
/// Numbers are checked before dates so purely numeric strings never become dates.
pub fn classify(text: &str) -> CellType {
    if is_blank(text) {
        CellType::Empty
    } else if is_number(text) {
        CellType::Number
    } else if datetime::parse(text, false).is_some() {
        CellType::Date
    } else {
        CellType::String
    }
}

/// Returns true if the text is numeric once thousands separators and whitespace are removed.
pub fn is_number(text: &str) -> bool {
    let stripped: String = text
        .chars()
        .filter(|char| *char != ',' && !char.is_whitespace())
        .collect();
    NUMBER_PATTERN.is_match(&stripped)
}

/// Reduces a column of cells to the type of its first non-empty cell, defaulting to String.
pub fn classify_column<'a, I>(values: I) -> CellType
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(classify)
        .find(|kind| *kind != CellType::Empty)
        .unwrap_or(CellType::String)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_empty() {
        assert_eq!(classify(""), CellType::Empty);
        assert_eq!(classify("   "), CellType::Empty);
        assert_eq!(classify("\t"), CellType::Empty);
    }

    #[test]
    fn classify_numbers() {
        for value in ["0", "100", "-50", "+3.5", "1,234,567.89", " 42 ", ".5", "1e10", "-2.5E-3", "7."] {
            assert_eq!(classify(value), CellType::Number, "{value}");
        }
    }

    #[test]
    fn numbers_win_over_dates() {
        assert_eq!(classify("2023"), CellType::Number);
        assert_eq!(classify("20230115"), CellType::Number);
        assert_eq!(classify("12"), CellType::Number);
    }

    #[test]
    fn classify_dates() {
        for value in ["2024-01-01", "03/04/2023", "14 Nov '23", "Nov 14th, 2023", "12:30", "2024-01-01T10:30:00", "Monday, 5 June 2023", "March"] {
            assert_eq!(classify(value), CellType::Date, "{value}");
        }
    }

    #[test]
    fn classify_strings() {
        for value in ["Date", "Amount", "Total Sales", "$1,200", "10kg", "N/A", "Q1", "1.2.3.4.5", "2024-13-45"] {
            assert_eq!(classify(value), CellType::String, "{value}");
        }
    }

    #[test]
    fn cell_codes_are_strings() {
        for value in ["A1", "B2", "P3", "T1", "Z9", "a 5", "at 5", "on 3"] {
            assert_eq!(classify(value), CellType::String, "{value}");
        }
        assert_eq!(classify_column(["A1", "B2", "C3"]), CellType::String);
    }

    #[test]
    fn column_type_is_first_non_empty() {
        assert_eq!(classify_column(["", " ", "12", "abc"]), CellType::Number);
        assert_eq!(classify_column(["", "2024-01-01"]), CellType::Date);
        assert_eq!(classify_column(["", ""]), CellType::String);
        assert_eq!(classify_column(Vec::<&str>::new()), CellType::String);
    }
}
