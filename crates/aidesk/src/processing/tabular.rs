//! CSV intake for the data-analysis tool.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::types::DataTable;

/// Load a CSV stream into a [`DataTable`]. The first record is the header;
/// short records are padded so every row matches the header width.
pub fn load_csv<R: Read>(reader: R) -> Result<DataTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if columns.is_empty() {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.context("Failed to read CSV record")?;
        let mut row: Vec<String> = record.iter().map(|cell| cell.to_string()).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    tracing::debug!(columns = columns.len(), rows = rows.len(), "Loaded CSV");
    Ok(DataTable::new(columns, rows))
}

pub fn load_csv_file(path: &Path) -> Result<DataTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    load_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_header_and_rows() {
        let data = "name,age\nAlice,30\nBob,25\n";
        let table = load_csv(data.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Alice", "30"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let data = "a,b,c\n1,2\n";
        let table = load_csv(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let data = "city,note\n\"Springfield, IL\",ok\n";
        let table = load_csv(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0][0], "Springfield, IL");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(load_csv(&b""[..]).is_err());
    }
}
