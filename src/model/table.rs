use crate::model::region::Region;
use serde::Serialize;

/// A table detected in a grid, positioned in the grid's original coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    /// Header cells, None when no header row was confirmed
    pub header: Option<Vec<String>>,
    /// Data rows below the header
    pub rows: Vec<Vec<String>>,
    pub region: Region,
}

impl Table {
    /// Header row (if any) followed by the data rows.
    pub fn rows_with_header(&self) -> Vec<Vec<String>> {
        self.header
            .iter()
            .chain(self.rows.iter())
            .cloned()
            .collect()
    }

    pub fn column_count(&self) -> usize {
        self.header
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// True when the table holds neither a header nor data.
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.rows.is_empty()
    }
}

/// Free-form rows found before or between tables.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetadataBlock {
    pub rows: Vec<Vec<String>>,
    pub region: Region,
}

impl MetadataBlock {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::region::parse_region;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn table_rows_with_header() {
        let table = Table {
            header: Some(row(&["Date", "Amount"])),
            rows: vec![row(&["2024-01-01", "100"]), row(&["2024-01-02", "-50", "x"])],
            region: parse_region("A1:B3").unwrap(),
        };
        assert_eq!(table.rows_with_header().len(), 3);
        assert_eq!(table.rows_with_header()[0], row(&["Date", "Amount"]));
        assert_eq!(table.column_count(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn headerless_table() {
        let table = Table {
            header: None,
            rows: vec![],
            region: parse_region("A1:A1").unwrap(),
        };
        assert!(table.rows_with_header().is_empty());
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());
    }
}
