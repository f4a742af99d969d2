//! Render pipeline: load tables → parse relations → build graph → visual model.
//!
//! Every call reloads the source tables, so edits to the data directory show
//! up on the next render without restarting anything.

use std::path::Path;

use crate::config::Config;
use crate::error::{LineageError, Result};
use crate::export::{export_to_file, render_html, ExportReport, RenderStyle};
use crate::graph::{build_graph, parse_relations, Graph};
use crate::image::ImageResolver;
use crate::person::{PersonRegistry, SpiritKeywords};
use crate::table::{Table, TableRegistry};
use crate::visual::{DirectoryEntry, NodeColor, VisualModel, VisualModelBuilder};

/// A finished render
#[derive(Debug, Clone)]
pub struct Rendered {
    pub graph: Graph,
    pub model: VisualModel,
    pub style: RenderStyle,
    /// Triples parsed from the relation table (before edge de-duplication)
    pub triple_count: usize,
}

impl Rendered {
    /// The interactive page for this render
    pub fn html(&self) -> Result<String> {
        render_html(&self.model, &self.style)
    }
}

/// Result of a render request
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// Person or relation table is missing or empty
    DataNotReady {
        persons_missing: bool,
        relations_missing: bool,
    },
    /// Relation table has rows but none parsed into a triple
    NoRelations,
    Ready(Rendered),
}

impl RenderOutcome {
    pub fn into_result(self) -> Result<Rendered> {
        match self {
            RenderOutcome::Ready(rendered) => Ok(rendered),
            RenderOutcome::NoRelations => Err(LineageError::NoRelations),
            RenderOutcome::DataNotReady {
                persons_missing,
                relations_missing,
            } => {
                let missing: Vec<&str> = [(persons_missing, "persons"), (relations_missing, "relations")]
                    .into_iter()
                    .filter(|(missing, _)| *missing)
                    .map(|(_, name)| name)
                    .collect();
                Err(LineageError::DataNotReady(missing.join(", ")))
            }
        }
    }

    /// Guidance for the user when nothing can be rendered
    pub fn message(&self) -> Option<String> {
        match self {
            RenderOutcome::Ready(_) => None,
            RenderOutcome::NoRelations => Some(
                "未解析到任何关系，请检查 relations 表（支持 source,target,relation 或 描述 列）".to_string(),
            ),
            RenderOutcome::DataNotReady { .. } => Some(
                "请确保 persons 与 relations 数据表已准备好（头像放在 static/avatars/ 或使用绝对路径）".to_string(),
            ),
        }
    }
}

/// Owns the configuration and the per-session resolvers
pub struct Pipeline {
    config: Config,
    tables: TableRegistry,
    images: ImageResolver,
    keywords: SpiritKeywords,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let images = ImageResolver::from_config(&config);
        let keywords = SpiritKeywords::new(config.keyword_terms());
        Self {
            config,
            tables: TableRegistry::new(),
            images,
            keywords,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keywords(&self) -> &SpiritKeywords {
        &self.keywords
    }

    pub fn load_persons(&self) -> PersonRegistry {
        let table = self.tables.load_or_empty(&self.config.persons_path());
        PersonRegistry::from_table(&table)
    }

    pub fn load_relations(&self) -> Table {
        self.tables.load_or_empty(&self.config.relations_path())
    }

    /// Style parameters for the template, with the background image resolved
    pub fn style(&self) -> RenderStyle {
        RenderStyle::from_config(&self.config.style, &self.images)
    }

    fn builder<'a>(&'a self, persons: &'a PersonRegistry) -> VisualModelBuilder<'a> {
        VisualModelBuilder::new(
            persons,
            &self.images,
            &self.keywords,
            NodeColor::highlight(&self.config.style),
        )
    }

    /// Build the visual model from the current contents of the data directory
    ///
    /// # Returns
    ///
    /// `Ready` with the graph, model and style, or the reason nothing can be
    /// drawn (`DataNotReady` for missing/empty tables, `NoRelations` when no
    /// row parses into a triple)
    pub fn render(&self) -> RenderOutcome {
        let persons = self.load_persons();
        let relations = self.load_relations();

        if persons.is_empty() || relations.is_empty() {
            log::warn!(
                "Data not ready: persons={} ({}), relations={} rows ({})",
                persons.len(),
                self.config.persons_path().display(),
                relations.len(),
                self.config.relations_path().display()
            );
            return RenderOutcome::DataNotReady {
                persons_missing: persons.is_empty(),
                relations_missing: relations.is_empty(),
            };
        }

        let triples = parse_relations(&relations);
        if triples.is_empty() {
            log::warn!("No relations parsed from {} rows", relations.len());
            return RenderOutcome::NoRelations;
        }

        let graph = build_graph(&triples);
        let model = self.builder(&persons).build(&graph);
        log::info!(
            "Rendered {} nodes ({} highlighted), {} edges",
            model.nodes.len(),
            model.highlighted_count(),
            model.edges.len()
        );
        if let Some(cache) = self.images.cache() {
            log::debug!("Image cache holds {} payloads", cache.len());
        }

        RenderOutcome::Ready(Rendered {
            graph,
            model,
            style: self.style(),
            triple_count: triples.len(),
        })
    }

    /// Render and write the artifact
    ///
    /// # Arguments
    ///
    /// * `output` - Target file; `None` uses the configured export path
    pub fn export(&self, output: Option<&Path>) -> Result<ExportReport> {
        let rendered = self.render().into_result()?;
        let html = rendered.html()?;
        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.export_path());
        export_to_file(&html, &path)
    }

    /// Directory cards for every person in the person table
    pub fn directory(&self) -> Vec<DirectoryEntry> {
        let persons = self.load_persons();
        self.builder(&persons).build_directory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLACEHOLDER_IMAGE;
    use std::fs;
    use tempfile::TempDir;

    fn project(persons: Option<&str>, relations: Option<&str>) -> (TempDir, Pipeline) {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        if let Some(content) = persons {
            fs::write(data.join("persons.csv"), content).unwrap();
        }
        if let Some(content) = relations {
            fs::write(data.join("relations.csv"), content).unwrap();
        }
        let mut config = Config::default();
        config.paths.root = temp_dir.path().to_path_buf();
        (temp_dir, Pipeline::new(config))
    }

    const PERSONS: &str = "name,avatar,intro,bio,is_wulao\nA,,老校长,忠诚奉献,\n";
    const RELATIONS: &str = "source,target,relation\nA,B,师徒\n";

    #[test]
    fn test_sample_round_trip() {
        let (_temp_dir, pipeline) = project(Some(PERSONS), Some(RELATIONS));
        let rendered = pipeline.render().into_result().unwrap();

        assert_eq!(rendered.graph.node_count(), 2);
        assert_eq!(rendered.graph.edge_count(), 1);
        assert_eq!(rendered.graph.edge_label("A", "B"), Some("师徒"));
        assert_eq!(rendered.triple_count, 1);

        let a = rendered.model.node("A").unwrap();
        assert!(a.highlighted);
        assert_eq!(a.tags, vec!["忠诚", "奉献"]);
        let b = rendered.model.node("B").unwrap();
        assert!(!b.highlighted);
        assert_eq!(b.image, PLACEHOLDER_IMAGE);

        assert_eq!(rendered.style.accent_color, "#FFD60A");
        assert_eq!(rendered.style.background, "#8B0000");
    }

    #[test]
    fn test_missing_tables_not_ready() {
        let (_temp_dir, pipeline) = project(None, Some(RELATIONS));
        match pipeline.render() {
            RenderOutcome::DataNotReady {
                persons_missing,
                relations_missing,
            } => {
                assert!(persons_missing);
                assert!(!relations_missing);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let (_temp_dir, pipeline) = project(Some(PERSONS), Some("source,target\n"));
        let outcome = pipeline.render();
        assert!(outcome.message().is_some());
        assert!(matches!(
            outcome.into_result(),
            Err(LineageError::DataNotReady(ref m)) if m == "relations"
        ));
    }

    #[test]
    fn test_no_relations_is_distinct() {
        let (_temp_dir, pipeline) = project(Some(PERSONS), Some("from,to\nA,B\n"));
        let outcome = pipeline.render();
        assert!(matches!(outcome, RenderOutcome::NoRelations));
        assert!(matches!(outcome.into_result(), Err(LineageError::NoRelations)));
    }

    #[test]
    fn test_description_schema_end_to_end() {
        let (_temp_dir, pipeline) =
            project(Some("name,bio\n张三,关爱学生\n"), Some("描述\n张三是李四的学生\n无效行\n"));
        let rendered = pipeline.render().into_result().unwrap();
        assert_eq!(rendered.graph.edge_label("张三", "李四"), Some("学生"));
        assert!(rendered.model.node("张三").unwrap().highlighted);
    }

    #[test]
    fn test_reload_on_every_render() {
        let (temp_dir, pipeline) = project(Some(PERSONS), Some(RELATIONS));
        assert_eq!(pipeline.render().into_result().unwrap().graph.node_count(), 2);

        fs::write(
            temp_dir.path().join("data/relations.csv"),
            "source,target,relation\nA,B,师徒\nB,C,同事\n",
        )
        .unwrap();
        assert_eq!(pipeline.render().into_result().unwrap().graph.node_count(), 3);
    }

    #[test]
    fn test_export_writes_default_path() {
        let (temp_dir, pipeline) = project(Some(PERSONS), Some(RELATIONS));
        let report = pipeline.export(None).unwrap();
        let expected = temp_dir.path().join("exports/genealogy_export.html");
        assert_eq!(report.path, expected);

        let html = fs::read_to_string(&expected).unwrap();
        assert!(html.contains("\"师徒\""));
        assert!(html.contains("\"忠诚\""));
    }

    #[test]
    fn test_export_not_ready_fails_without_writing() {
        let (temp_dir, pipeline) = project(None, None);
        let err = pipeline.export(None).unwrap_err();
        assert!(matches!(err, LineageError::DataNotReady(ref m) if m == "persons, relations"));
        assert!(!temp_dir.path().join("exports").exists());
    }

    #[test]
    fn test_directory() {
        let (_temp_dir, pipeline) = project(Some("name,bio\nX,务实\nY,\n"), None);
        let directory = pipeline.directory();
        assert_eq!(directory.len(), 2);
        assert!(directory[0].highlighted);
        assert!(!directory[1].highlighted);
    }
}
