use serde::Deserialize;
use serde::Serialize;

/// Thresholds steering table detection.
///
/// Every field has a default, so a partial JSON or TOML document is enough to override a
/// single value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    /// Minimum share of the two source rows' filled cells a merged row must keep.
    pub wrap_fill_ratio: f64,

    /// Rows whose fill ratio within an island's columns falls below this are sparse.
    pub sparse_row_ratio: f64,

    /// Island growth stops after this many consecutive sparse rows.
    pub max_consecutive_sparse_rows: usize,

    /// Share of columns that must be type-homogeneous to confirm a header row.
    pub header_agreement_ratio: f64,

    /// Rows below a header candidate compared for type homogeneity.
    pub header_sample_rows: usize,

    /// Upper bound on candidate rows tried when confirming a header.
    pub header_iteration_cap: usize,

    /// Rows sampled when validating a region as dates.
    pub date_sample_rows: usize,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            wrap_fill_ratio: 0.8,
            sparse_row_ratio: 0.2,
            max_consecutive_sparse_rows: 3,
            header_agreement_ratio: 0.7,
            header_sample_rows: 3,
            header_iteration_cap: 100,
            date_sample_rows: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override() {
        let criteria: Criteria = serde_json::from_str(r#"{"header_sample_rows": 5}"#).unwrap();
        assert_eq!(criteria.header_sample_rows, 5);
        assert_eq!(criteria.max_consecutive_sparse_rows, 3);
        assert_eq!(criteria.wrap_fill_ratio, 0.8);
    }
}
