//! Renderer-agnostic visual model: styled nodes and directed edges ready for
//! a vis-network style front-end.

use serde::Serialize;

use crate::config::StyleConfig;
use crate::graph::Graph;
use crate::image::ImageResolver;
use crate::person::{resolve_record, PersonRegistry, SpiritKeywords};

/// Node shape understood by the renderer: image clipped to a circle
pub const NODE_SHAPE: &str = "circularImage";

/// Separator between tags and biography in the detail panel body.
/// The renderer turns it into line breaks.
pub const BODY_SEPARATOR: &str = "; ";

/// Border/background override for highlighted nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeColor {
    pub border: String,
    pub background: String,
}

impl NodeColor {
    pub fn highlight(style: &StyleConfig) -> Self {
        Self {
            border: style.highlight_border.clone(),
            background: style.highlight_background.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualNode {
    pub id: String,
    pub label: String,
    /// `data:` URI or the placeholder payload
    pub image: String,
    pub shape: String,
    /// Hover tooltip HTML (name and intro only)
    pub title: String,
    /// Detail panel body: tags, then biography
    pub bio: String,
    pub tags: Vec<String>,
    pub highlighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NodeColor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualEdge {
    pub from: String,
    pub to: String,
    pub label: String,
    pub arrows: String,
}

/// Nodes and edges for one render
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisualModel {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

impl VisualModel {
    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn highlighted_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.highlighted).count()
    }
}

/// Person directory card, listed in person-table order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub intro: String,
    pub bio: String,
    pub image: String,
    pub tags: Vec<String>,
    pub highlighted: bool,
}

/// Combines graph, person registry, image resolution and highlight styling
pub struct VisualModelBuilder<'a> {
    registry: &'a PersonRegistry,
    images: &'a ImageResolver,
    keywords: &'a SpiritKeywords,
    highlight: NodeColor,
}

impl<'a> VisualModelBuilder<'a> {
    pub fn new(
        registry: &'a PersonRegistry,
        images: &'a ImageResolver,
        keywords: &'a SpiritKeywords,
        highlight: NodeColor,
    ) -> Self {
        Self {
            registry,
            images,
            keywords,
            highlight,
        }
    }

    pub fn build(&self, graph: &Graph) -> VisualModel {
        let nodes = graph
            .nodes()
            .map(|id| {
                let name = id.as_str();
                let person = self.registry.resolve(name, self.keywords);
                let image = self.avatar(&person.avatar);
                VisualNode {
                    id: name.to_string(),
                    label: name.to_string(),
                    image,
                    shape: NODE_SHAPE.to_string(),
                    title: tooltip_html(name, &person.intro),
                    bio: detail_body(&person.tags, &person.bio),
                    color: person.highlighted.then(|| self.highlight.clone()),
                    tags: person.tags,
                    highlighted: person.highlighted,
                }
            })
            .collect();

        let edges = graph
            .edges()
            .map(|(from, to, label)| VisualEdge {
                from: from.to_string(),
                to: to.to_string(),
                label: label.to_string(),
                arrows: "to".to_string(),
            })
            .collect();

        VisualModel { nodes, edges }
    }

    /// Directory cards for every person record
    pub fn build_directory(&self) -> Vec<DirectoryEntry> {
        self.registry
            .records()
            .iter()
            .map(|record| {
                let person = resolve_record(record, self.keywords);
                DirectoryEntry {
                    name: record.name.clone(),
                    image: self.avatar(&person.avatar),
                    intro: person.intro,
                    bio: person.bio,
                    tags: person.tags,
                    highlighted: person.highlighted,
                }
            })
            .collect()
    }

    fn avatar(&self, reference: &str) -> String {
        if reference.trim().is_empty() {
            self.images.placeholder().to_string()
        } else {
            self.images.resolve(reference)
        }
    }
}

/// Hover tooltip: bold name over the intro line
pub fn tooltip_html(name: &str, intro: &str) -> String {
    format!(
        "<div style='max-width:260px;font-size:13px;'><b>{}</b><br>{}</div>",
        escape_html(name),
        escape_html(intro)
    )
}

/// Detail panel body: tags first, then the biography if present
pub fn detail_body(tags: &[String], bio: &str) -> String {
    let mut parts: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
    if !bio.is_empty() {
        parts.push(bio);
    }
    parts.join(BODY_SEPARATOR)
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
