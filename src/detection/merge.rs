use crate::model::table::MetadataBlock;
use crate::model::table::Table;
use crate::spreadsheet::is_blank;
use std::collections::HashSet;
use tracing::debug;

/// Picks the representative table among the islands.
///
/// Tables are grouped by their exact header cells. The largest group wins, the earliest
/// discovered group breaking ties, and its members are concatenated in discovery order
/// under the first member's header. Tables outside the winning group are discarded.
pub fn merge_tables(tables: Vec<Table>) -> Option<Table> {
    let mut groups: Vec<Vec<Table>> = Vec::new();
    for table in tables {
        match groups.iter_mut().find(|group| group[0].header == table.header) {
            Some(group) => group.push(table),
            None => groups.push(vec![table]),
        }
    }

    let total = groups.len();
    let mut best: Option<Vec<Table>> = None;
    for group in groups {
        if best.as_ref().map(|best| group.len() > best.len()).unwrap_or(true) {
            best = Some(group);
        }
    }
    let group = best?;
    if total > 1 {
        debug!(groups = total, kept = group.len(), "Discarded tables with a different header");
    }

    let mut members = group.into_iter();
    let mut merged = members.next()?;
    for table in members {
        merged.region = merged.region.union(&table.region);
        merged.rows.extend(table.rows);
    }
    Some(merged)
}

/// Concatenates metadata blocks, dropping rows already seen after blank normalization.
pub fn merge_metadata(blocks: Vec<MetadataBlock>) -> Option<MetadataBlock> {
    let region = blocks
        .iter()
        .map(|block| block.region)
        .reduce(|merged, region| merged.union(&region))?;

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut rows = Vec::new();
    for row in blocks.into_iter().flat_map(|block| block.rows) {
        let row: Vec<String> = row
            .into_iter()
            .map(|value| if is_blank(&value) { String::new() } else { value })
            .collect();
        if seen.insert(row.clone()) {
            rows.push(row);
        }
    }
    Some(MetadataBlock { rows, region })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::region::parse_region;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn table(header: &[&str], rows: &[&[&str]], region: &str) -> Table {
        Table {
            header: Some(row(header)),
            rows: rows.iter().map(|values| row(values)).collect(),
            region: parse_region(region).unwrap(),
        }
    }

    #[test]
    fn identical_headers_are_concatenated() {
        let tables = vec![
            table(&["Item", "Qty"], &[&["Pen", "2"], &["Ink", "1"]], "A1:B3"),
            table(&["Item", "Qty"], &[&["Pad", "3"], &["Cap", "5"]], "A6:B8"),
            table(&["Item", "Qty"], &[&["Box", "1"], &["Jar", "4"]], "A11:B13"),
        ];
        let merged = merge_tables(tables).unwrap();
        assert_eq!(merged.rows_with_header().len(), 1 + 3 * 2);
        assert_eq!(merged.header, Some(row(&["Item", "Qty"])));
        assert_eq!(merged.rows[0], row(&["Pen", "2"]));
        assert_eq!(merged.rows[5], row(&["Jar", "4"]));
        assert_eq!(merged.region.to_string(), "A1:B13");
    }

    #[test]
    fn largest_group_wins() {
        let tables = vec![
            table(&["Name", "Age"], &[&["Ann", "30"]], "A1:B2"),
            table(&["Item", "Qty"], &[&["Pen", "2"]], "A5:B6"),
            table(&["Item", "Qty"], &[&["Pad", "3"]], "A9:B10"),
        ];
        let merged = merge_tables(tables).unwrap();
        assert_eq!(merged.header, Some(row(&["Item", "Qty"])));
        assert_eq!(merged.rows, vec![row(&["Pen", "2"]), row(&["Pad", "3"])]);
        assert_eq!(merged.region.to_string(), "A5:B10");
    }

    #[test]
    fn singleton_groups_keep_first_table() {
        let first = table(&["Name", "Age"], &[&["Ann", "30"]], "A1:B2");
        let second = table(&["Item", "Qty"], &[&["Pen", "2"]], "A5:B6");
        assert_eq!(merge_tables(vec![first.clone(), second]), Some(first));
        assert_eq!(merge_tables(Vec::new()), None);
    }

    #[test]
    fn header_match_is_exact() {
        let tables = vec![
            table(&["Item", "Qty"], &[&["Pen", "2"]], "A1:B2"),
            table(&["item", "Qty"], &[&["Pad", "3"]], "A5:B6"),
        ];
        let merged = merge_tables(tables).unwrap();
        assert_eq!(merged.rows.len(), 1);
    }

    #[test]
    fn duplicate_metadata_rows_are_dropped() {
        let block = |region: &str| MetadataBlock {
            rows: vec![row(&["Report", " "]), row(&["Generated", "2024"])],
            region: parse_region(region).unwrap(),
        };
        let merged = merge_metadata(vec![block("A1:B2"), block("A6:B7")]).unwrap();
        assert_eq!(merged.rows, vec![row(&["Report", ""]), row(&["Generated", "2024"])]);
        assert_eq!(merged.region.to_string(), "A1:B7");
    }

    #[test]
    fn metadata_order_is_preserved() {
        let blocks = vec![
            MetadataBlock {
                rows: vec![row(&["b"]), row(&["a"])],
                region: parse_region("A1:A2").unwrap(),
            },
            MetadataBlock {
                rows: vec![row(&["c"]), row(&["b"])],
                region: parse_region("A5:A6").unwrap(),
            },
        ];
        let merged = merge_metadata(blocks).unwrap();
        assert_eq!(merged.rows, vec![row(&["b"]), row(&["a"]), row(&["c"])]);
        assert_eq!(merge_metadata(Vec::new()), None);
    }
}
