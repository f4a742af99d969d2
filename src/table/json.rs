use super::{Table, TableReader};
use crate::error::{LineageError, Result};
use serde_json::Value as JsonValue;

/// JSON tables: a top-level array of flat objects
pub struct JsonTableReader;

impl TableReader for JsonTableReader {
    fn can_read(&self, extension: &str) -> bool {
        extension == "json"
    }

    fn read(&self, content: &str, path: &str) -> Result<Table> {
        let value: JsonValue = serde_json::from_str(content)
            .map_err(|e| LineageError::Parse(format!("JSON parse error in {}: {}", path, e)))?;

        let JsonValue::Array(records) = value else {
            return Err(LineageError::Parse(format!(
                "{}: expected an array of records",
                path
            )));
        };

        // Columns are the union of keys across records; serde_json yields each
        // record's keys sorted
        let mut columns: Vec<String> = Vec::new();
        let mut objects = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            match record {
                JsonValue::Object(map) => {
                    for key in map.keys() {
                        if !columns.iter().any(|c| c == key) {
                            columns.push(key.clone());
                        }
                    }
                    objects.push(map);
                }
                other => log::warn!(
                    "Skipping record {} in {}: not an object ({})",
                    idx,
                    path,
                    other
                ),
            }
        }

        let rows = objects
            .into_iter()
            .map(|map| {
                columns
                    .iter()
                    .map(|col| map.get(col).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Table::new(columns, rows))
    }
}

/// Coerce a JSON value into a table cell
fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
