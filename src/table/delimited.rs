use super::{Table, TableReader};
use crate::error::Result;

/// Comma- or tab-separated tables with a header row
///
/// A UTF-8 byte-order mark is stripped, rows may be shorter or longer than
/// the header, and records the CSV decoder rejects are skipped one by one.
pub struct CsvTableReader;

impl TableReader for CsvTableReader {
    fn can_read(&self, extension: &str) -> bool {
        matches!(extension, "csv" | "tsv")
    }

    fn read(&self, content: &str, path: &str) -> Result<Table> {
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = if path.to_lowercase().ends_with(".tsv") {
            b'\t'
        } else {
            b','
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            match record {
                Ok(record) => rows.push(record.iter().map(|c| c.to_string()).collect()),
                Err(e) => log::warn!("Skipping malformed row {} in {}: {}", idx + 2, path, e),
            }
        }

        Ok(Table::new(columns, rows))
    }
}
