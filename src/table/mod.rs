//! Loosely typed tabular sources (CSV / JSON) read into string cells.
//!
//! Every cell is a string; typing happens at the consumer boundary
//! (`person::PersonRegistry`, `graph::extraction`).

pub mod delimited;
pub mod json;

use std::path::Path;

use crate::error::{LineageError, Result};

/// A table of string cells with named columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from string slices
    #[cfg(test)]
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<&str>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    /// True when the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Index of the column named exactly `name`
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// Index of the first column whose name matches `name` case-insensitively
    pub fn column_ignore_case(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name))
    }

    /// Cell value, empty for rows shorter than the header
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

/// Trait for table readers
pub trait TableReader: Send + Sync {
    /// Check if this reader can handle the given file extension
    fn can_read(&self, extension: &str) -> bool;

    /// Read file content into a table
    fn read(&self, content: &str, path: &str) -> Result<Table>;
}

/// Reader registry that selects the appropriate reader by extension
pub struct TableRegistry {
    readers: Vec<Box<dyn TableReader>>,
}

impl TableRegistry {
    /// Create a new registry with all built-in readers
    pub fn new() -> Self {
        let mut registry = Self {
            readers: Vec::new(),
        };

        registry.register(Box::new(delimited::CsvTableReader));
        registry.register(Box::new(json::JsonTableReader));

        registry
    }

    /// Register a reader
    pub fn register(&mut self, reader: Box<dyn TableReader>) {
        self.readers.push(reader);
    }

    /// Find a reader that can handle the given extension
    pub fn find_reader(&self, extension: &str) -> Option<&dyn TableReader> {
        self.readers
            .iter()
            .find(|r| r.can_read(extension))
            .map(|r| r.as_ref())
    }

    /// Read a table from disk
    pub fn load(&self, path: &Path) -> Result<Table> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        let reader = self.find_reader(&extension).ok_or_else(|| {
            LineageError::Parse(format!(
                "No table reader for extension '{}' ({})",
                extension,
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        reader.read(&content, &path.to_string_lossy())
    }

    /// Read a table, treating a missing or unreadable file as an empty table
    pub fn load_or_empty(&self, path: &Path) -> Table {
        if !path.exists() {
            log::debug!("Table not found: {}", path.display());
            return Table::default();
        }

        match self.load(path) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("Could not read table {}: {}", path.display(), e);
                Table::default()
            }
        }
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}
