//! Person registry: typed person records and per-node resolution.

use std::collections::HashMap;

use serde::Serialize;

use crate::table::Table;

/// One row of the person table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonRecord {
    pub name: String,
    pub intro: String,
    pub bio: String,
    /// Avatar filename or path, resolved by `image::ImageResolver`
    pub avatar: String,
    /// Explicit highlight override (`is_wulao` column equal to "1")
    pub is_wulao: bool,
}

/// Presentation data recovered for a graph node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPerson {
    pub intro: String,
    pub bio: String,
    pub avatar: String,
    pub tags: Vec<String>,
    pub highlighted: bool,
}

/// Spirit keywords matched against biographies, in fixed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiritKeywords {
    terms: Vec<String>,
}

impl SpiritKeywords {
    pub fn new(terms: Vec<String>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Keywords occurring anywhere in `bio`, in keyword-list order
    pub fn tags(&self, bio: &str) -> Vec<String> {
        self.terms
            .iter()
            .filter(|kw| bio.contains(kw.as_str()))
            .cloned()
            .collect()
    }
}

/// Person records looked up by exact name
#[derive(Debug, Clone, Default)]
pub struct PersonRegistry {
    records: Vec<PersonRecord>,
    by_name: HashMap<String, usize>,
}

impl PersonRegistry {
    pub fn new(records: Vec<PersonRecord>) -> Self {
        let mut by_name = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            // First record wins for duplicate names
            by_name.entry(record.name.clone()).or_insert(idx);
        }
        Self { records, by_name }
    }

    /// Build the registry from a person table.
    ///
    /// The table needs a `name` column; `intro`, `bio`, `avatar` and
    /// `is_wulao` are optional. Rows without a name are dropped.
    pub fn from_table(table: &Table) -> Self {
        let Some(name_col) = table.column("name") else {
            if !table.is_empty() {
                log::warn!("Person table has no 'name' column (columns: {:?})", table.columns);
            }
            return Self::default();
        };
        let intro_col = table.column("intro");
        let bio_col = table.column("bio");
        let avatar_col = table.column("avatar");
        let flag_col = table.column("is_wulao");

        let field = |row: usize, col: Option<usize>| -> String {
            col.map(|c| table.cell(row, c).to_string()).unwrap_or_default()
        };

        let mut records = Vec::new();
        for row in 0..table.len() {
            let name = table.cell(row, name_col).trim();
            if name.is_empty() {
                log::debug!("Skipping person row {} without a name", row + 1);
                continue;
            }
            records.push(PersonRecord {
                name: name.to_string(),
                intro: field(row, intro_col),
                bio: field(row, bio_col),
                avatar: field(row, avatar_col).trim().to_string(),
                is_wulao: field(row, flag_col).trim() == "1",
            });
        }

        Self::new(records)
    }

    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact, case-sensitive lookup; first record for a duplicated name
    pub fn find(&self, name: &str) -> Option<&PersonRecord> {
        self.by_name.get(name).map(|&idx| &self.records[idx])
    }

    /// Resolve display fields, tags and highlight state for a node name.
    /// Unknown names resolve to empty fields and no highlight.
    pub fn resolve(&self, name: &str, keywords: &SpiritKeywords) -> ResolvedPerson {
        match self.find(name) {
            Some(record) => resolve_record(record, keywords),
            None => ResolvedPerson::default(),
        }
    }
}

/// Tags and highlight state for one record
pub fn resolve_record(record: &PersonRecord, keywords: &SpiritKeywords) -> ResolvedPerson {
    let tags = keywords.tags(&record.bio);
    let highlighted = !tags.is_empty() || record.is_wulao;
    ResolvedPerson {
        intro: record.intro.clone(),
        bio: record.bio.clone(),
        avatar: record.avatar.clone(),
        tags,
        highlighted,
    }
}
