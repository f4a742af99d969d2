//! Relation extraction from relation tables (column-based or regex-based).

use regex::Regex;
use std::sync::OnceLock;

use super::RelationTriple;
use crate::table::Table;

/// One way of reading triples out of a relation table
pub trait RelationSchema {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether the table's columns match this schema
    fn applies(&self, table: &Table) -> bool;

    /// Extract triples; rows that do not yield a valid triple are dropped
    fn extract(&self, table: &Table) -> Vec<RelationTriple>;
}

/// `source` / `target` / optional `relation` columns (case-insensitive names)
pub struct ExplicitColumns;

impl RelationSchema for ExplicitColumns {
    fn name(&self) -> &'static str {
        "source/target"
    }

    fn applies(&self, table: &Table) -> bool {
        table.column_ignore_case("source").is_some() && table.column_ignore_case("target").is_some()
    }

    fn extract(&self, table: &Table) -> Vec<RelationTriple> {
        let (Some(source), Some(target)) = (
            table.column_ignore_case("source"),
            table.column_ignore_case("target"),
        ) else {
            return Vec::new();
        };
        let relation = table.column_ignore_case("relation");

        (0..table.len())
            .filter_map(|row| {
                let predicate = relation.map(|col| table.cell(row, col)).unwrap_or("");
                RelationTriple::new(table.cell(row, source), predicate, table.cell(row, target))
            })
            .collect()
    }
}

/// Free-text `描述` / `description` column read with the pattern
/// `<subject>是<object>的<relation>` ("subject is object's relation")
pub struct DescriptionSchema;

impl DescriptionSchema {
    fn column(table: &Table) -> Option<usize> {
        table
            .column("描述")
            .or_else(|| table.column_ignore_case("description"))
    }

    /// Parse one description line. Only a match at the start of the line counts.
    pub fn parse_line(text: &str) -> Option<RelationTriple> {
        let cap = description_pattern().captures(text)?;
        let subject = cap.get(1).map_or("", |m| m.as_str());
        let object = cap.get(2).map_or("", |m| m.as_str());
        let relation = cap.get(3).map_or("", |m| m.as_str());
        RelationTriple::new(subject, relation, object)
    }
}

impl RelationSchema for DescriptionSchema {
    fn name(&self) -> &'static str {
        "description"
    }

    fn applies(&self, table: &Table) -> bool {
        Self::column(table).is_some()
    }

    fn extract(&self, table: &Table) -> Vec<RelationTriple> {
        let Some(col) = Self::column(table) else {
            return Vec::new();
        };

        (0..table.len())
            .filter_map(|row| {
                let text = table.cell(row, col);
                let triple = Self::parse_line(text);
                if triple.is_none() {
                    log::debug!("No relation found in description: {}", text);
                }
                triple
            })
            .collect()
    }
}

fn description_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Each group: CJK ideographs, ASCII letters/digits, '_', whitespace, '-'
        Regex::new(
            r"^([\x{4e00}-\x{9fa5}A-Za-z0-9_\s-]{1,60})是([\x{4e00}-\x{9fa5}A-Za-z0-9_\s-]{0,60})的([\x{4e00}-\x{9fa5}A-Za-z0-9_\s-]{1,60})",
        )
        .expect("Invalid regex pattern")
    })
}

/// Extract relation triples from a relation table.
///
/// Schemas are tried in order and the first whose columns match is used;
/// an empty table or one matching no schema yields no triples.
pub fn parse_relations(table: &Table) -> Vec<RelationTriple> {
    if table.is_empty() {
        return Vec::new();
    }

    let schemas: [&dyn RelationSchema; 2] = [&ExplicitColumns, &DescriptionSchema];
    match schemas.iter().find(|s| s.applies(table)) {
        Some(schema) => {
            let triples = schema.extract(table);
            log::debug!(
                "Parsed {} triples from {} rows using {} schema",
                triples.len(),
                table.len(),
                schema.name()
            );
            triples
        }
        None => {
            log::warn!("Relation table columns {:?} match no known schema", table.columns);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_RELATION;

    fn triple(t: &RelationTriple) -> (&str, &str, &str) {
        (t.subject.as_str(), t.predicate.as_str(), t.object.as_str())
    }

    #[test]
    fn test_explicit_columns_basic() {
        let table = Table::from_rows(
            &["source", "target", "relation"],
            vec![vec!["A", "B", "师徒"], vec![" C ", " D ", " 同事 "]],
        );
        let triples = parse_relations(&table);
        assert_eq!(triples.len(), 2);
        assert_eq!(triple(&triples[0]), ("A", "师徒", "B"));
        assert_eq!(triple(&triples[1]), ("C", "同事", "D"));
    }

    #[test]
    fn test_explicit_columns_case_insensitive_without_relation() {
        let table = Table::from_rows(&["Source", "TARGET"], vec![vec!["A", "B"]]);
        let triples = parse_relations(&table);
        assert_eq!(triples.len(), 1);
        assert_eq!(triple(&triples[0]), ("A", DEFAULT_RELATION, "B"));
    }

    #[test]
    fn test_explicit_columns_drop_blank_endpoints() {
        let table = Table::from_rows(
            &["source", "target", "relation"],
            vec![
                vec!["A", "", "师徒"],
                vec!["  ", "B", "师徒"],
                vec!["A", "B", ""],
                vec!["E"],
            ],
        );
        let triples = parse_relations(&table);
        assert_eq!(triples.len(), 1);
        assert_eq!(triple(&triples[0]), ("A", DEFAULT_RELATION, "B"));
    }

    #[test]
    fn test_explicit_columns_win_over_description() {
        let table = Table::from_rows(
            &["source", "target", "描述"],
            vec![vec!["", "", "张三是李四的学生"]],
        );
        assert!(parse_relations(&table).is_empty());
    }

    #[test]
    fn test_description_example() {
        let table = Table::from_rows(&["描述"], vec![vec!["张三是李四的学生"]]);
        let triples = parse_relations(&table);
        assert_eq!(triples.len(), 1);
        assert_eq!(triple(&triples[0]), ("张三", "学生", "李四"));
    }

    #[test]
    fn test_description_english_column_and_spaces() {
        let table = Table::from_rows(
            &["Description"],
            vec![vec!["Wang Wu 是 Zhao Liu 的 mentor"]],
        );
        let triples = parse_relations(&table);
        assert_eq!(triples.len(), 1);
        assert_eq!(triple(&triples[0]), ("Wang Wu", "mentor", "Zhao Liu"));
    }

    #[test]
    fn test_description_skips_non_matching_lines() {
        let table = Table::from_rows(
            &["描述"],
            vec![
                vec!["没有关系的句子"],
                vec!["，张三是李四的学生"],
                vec!["王五是的学生"],
                vec!["赵六是钱七的老师"],
            ],
        );
        let triples = parse_relations(&table);
        assert_eq!(triples.len(), 1);
        assert_eq!(triple(&triples[0]), ("赵六", "老师", "钱七"));
    }

    #[test]
    fn test_description_only_first_match_used() {
        let parsed = DescriptionSchema::parse_line("甲是乙的学生，丙是丁的老师").unwrap();
        assert_eq!(triple(&parsed), ("甲", "学生", "乙"));
    }

    #[test]
    fn test_description_parse_is_deterministic() {
        let text = "张三是李四的学生";
        assert_eq!(
            DescriptionSchema::parse_line(text),
            DescriptionSchema::parse_line(text)
        );
        assert_eq!(DescriptionSchema::parse_line("无匹配"), None);
        assert_eq!(DescriptionSchema::parse_line("无匹配"), None);
    }

    #[test]
    fn test_empty_or_unknown_tables() {
        assert!(parse_relations(&Table::default()).is_empty());

        let table = Table::from_rows(&["from", "to"], vec![vec!["A", "B"]]);
        assert!(parse_relations(&table).is_empty());
    }
}
