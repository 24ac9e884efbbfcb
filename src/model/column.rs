use crate::model::region::parse_region;
use crate::model::region::Region;
use crate::model::region::RegionError;
use crate::spreadsheet::cell::CellType;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while validating column mapping records.
#[derive(Error, Debug, PartialEq)]
pub enum ColumnError {
    #[error("Column name must not be blank")]
    BlankName,

    #[error("{0}")]
    RegionError(#[from] RegionError),
}

/// Column found under a confirmed header row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// Header cell text
    pub name: String,
    /// Type of the first non-empty data cell below the header
    pub inferred_type: CellType,
    /// Data cells of the column, header excluded
    pub region: Region,
}

/// Column with the attribute it was mapped to, validated once when built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnMapping {
    name: String,
    #[serde(rename = "type")]
    kind: CellType,
    region: Region,
    mapped_attribute: Option<String>,
}

impl ColumnMapping {
    /// Builds a mapping from boundary input, rejecting blank names and malformed regions.
    pub fn new(
        name: &str,
        kind: CellType,
        region: &str,
        mapped_attribute: Option<&str>,
    ) -> Result<Self, ColumnError> {
        let name = name.trim();
        if name.is_empty() {
            Err(ColumnError::BlankName)?
        }
        Ok(ColumnMapping {
            name: name.to_owned(),
            kind,
            region: parse_region(region)?,
            mapped_attribute: mapped_attribute
                .map(str::trim)
                .filter(|attribute| !attribute.is_empty())
                .map(str::to_owned),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CellType {
        self.kind
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn mapped_attribute(&self) -> Option<&str> {
        self.mapped_attribute.as_deref()
    }

    /// Returns a new mapping pointing at `attribute`.
    pub fn with_attribute(&self, attribute: &str) -> Self {
        ColumnMapping {
            mapped_attribute: Some(attribute.to_owned()),
            ..self.clone()
        }
    }
}

impl From<&ColumnDescriptor> for ColumnMapping {
    fn from(descriptor: &ColumnDescriptor) -> Self {
        ColumnMapping {
            name: descriptor.name.to_owned(),
            kind: descriptor.inferred_type,
            region: descriptor.region,
            mapped_attribute: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_validates_boundary_input() {
        let mapping = ColumnMapping::new(" Amount ", CellType::Number, "B2:B10", Some("amount")).unwrap();
        assert_eq!(mapping.name(), "Amount");
        assert_eq!(mapping.kind(), CellType::Number);
        assert_eq!(mapping.region().to_string(), "B2:B10");
        assert_eq!(mapping.mapped_attribute(), Some("amount"));

        assert_eq!(ColumnMapping::new(" ", CellType::String, "A1:A2", None), Err(ColumnError::BlankName));
        assert!(matches!(
            ColumnMapping::new("Date", CellType::Date, "A2-A9", None),
            Err(ColumnError::RegionError(RegionError::InvalidRegion(_)))
        ));
        let mapping = ColumnMapping::new("Date", CellType::Date, "A2:A9", Some("  ")).unwrap();
        assert_eq!(mapping.mapped_attribute(), None);
    }

    #[test]
    fn mapping_from_descriptor() {
        let descriptor = ColumnDescriptor {
            name: "Date".to_owned(),
            inferred_type: CellType::Date,
            region: parse_region("A2:A3").unwrap(),
        };
        let mapping = ColumnMapping::from(&descriptor);
        assert_eq!(mapping.mapped_attribute(), None);
        let mapped = mapping.with_attribute("transaction_date");
        assert_eq!(mapped.mapped_attribute(), Some("transaction_date"));
        assert_eq!(mapping.mapped_attribute(), None);
        assert_eq!(
            serde_json::to_value(&mapped).unwrap(),
            serde_json::json!({
                "name": "Date",
                "type": "date",
                "region": "A2:A3",
                "mapped_attribute": "transaction_date",
            })
        );
    }
}
