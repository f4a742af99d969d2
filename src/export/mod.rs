//! Self-contained HTML export of a visual model.
//!
//! Images are already inlined as `data:` URIs in the model; the only
//! remaining network dependency of an exported file is the vis-network
//! script referenced by the template.

pub mod template;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::config::StyleConfig;
use crate::error::{LineageError, Result};
use crate::image::ImageResolver;
use crate::visual::VisualModel;

/// The three style parameters substituted into the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderStyle {
    pub accent_color: String,
    pub edge_color: String,
    /// CSS background value: a color or `url('<data uri>')`
    pub background: String,
}

impl RenderStyle {
    /// Background image wins over the background color when it resolves to a file
    pub fn from_config(style: &StyleConfig, images: &ImageResolver) -> Self {
        let background = style
            .background_image
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .and_then(|reference| {
                let resolved = images.resolve_background(reference);
                if resolved.is_none() {
                    log::warn!("Background image not found: {}, using {}", reference, style.background);
                }
                resolved
            })
            .map(|uri| format!("url('{}')", uri))
            .unwrap_or_else(|| style.background.clone());

        Self {
            accent_color: style.accent_color.clone(),
            edge_color: style.edge_color.clone(),
            background,
        }
    }
}

/// Outcome of writing an export artifact
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
    pub generated_at: DateTime<Utc>,
}

/// Serialize a value for embedding inside a `<script>` block
fn script_literal<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Replace every marker in one pass; substituted text is never rescanned
fn substitute(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = pairs
            .iter()
            .filter_map(|(marker, value)| rest.find(marker).map(|idx| (idx, *marker, *value)))
            .min_by_key(|(idx, _, _)| *idx);

        match next {
            Some((idx, marker, value)) => {
                out.push_str(&rest[..idx]);
                out.push_str(value);
                rest = &rest[idx + marker.len()..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    out
}

/// Render the interactive page for a model
///
/// # Arguments
///
/// * `model` - Nodes and edges to embed in the page
/// * `style` - Colors and optional background image payload
///
/// # Returns
///
/// The complete self-contained HTML document
pub fn render_html(model: &VisualModel, style: &RenderStyle) -> Result<String> {
    let nodes = script_literal(&model.nodes)?;
    let edges = script_literal(&model.edges)?;

    Ok(substitute(
        template::PAGE,
        &[
            (template::ACCENT, &style.accent_color),
            (template::EDGE, &style.edge_color),
            (template::BACKGROUND, &style.background),
            (template::NODES, &nodes),
            (template::EDGES, &edges),
        ],
    ))
}

/// Hex SHA-256 of the given bytes
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Write an artifact to `path`, creating its directory
///
/// # Returns
///
/// Path, size, SHA-256 digest and timestamp of the written file
pub fn export_to_file(html: &str, path: &Path) -> Result<ExportReport> {
    let export_err = |source: std::io::Error| LineageError::Export {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(export_err)?;
    }
    std::fs::write(path, html).map_err(export_err)?;

    let report = ExportReport {
        path: path.to_path_buf(),
        bytes: html.len(),
        sha256: sha256_hex(html.as_bytes()),
        generated_at: Utc::now(),
    };
    log::info!(
        "Exported {} ({} bytes, sha256 {})",
        report.path.display(),
        report.bytes,
        report.sha256
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::visual::{VisualEdge, VisualNode};
    use std::fs;
    use tempfile::TempDir;

    fn style() -> RenderStyle {
        RenderStyle {
            accent_color: "#FFD60A".to_string(),
            edge_color: "#8b4513".to_string(),
            background: "#8B0000".to_string(),
        }
    }

    fn node(id: &str) -> VisualNode {
        VisualNode {
            id: id.to_string(),
            label: id.to_string(),
            image: "data:image/png;base64,AAAA".to_string(),
            shape: "circularImage".to_string(),
            title: format!("<div><b>{}</b></div>", id),
            bio: String::new(),
            tags: vec![],
            highlighted: false,
            color: None,
        }
    }

    /// Text of `const <name> = ...;` in the rendered page
    fn embedded<'a>(html: &'a str, name: &str) -> &'a str {
        let start = html.find(&format!("const {} = ", name)).unwrap() + name.len() + 9;
        let end = start + html[start..].find(";\n").unwrap();
        &html[start..end]
    }

    #[test]
    fn test_empty_model_exports_empty_arrays() {
        let html = render_html(&VisualModel::default(), &style()).unwrap();
        assert_eq!(embedded(&html, "nodesData"), "[]");
        assert_eq!(embedded(&html, "edgesData"), "[]");
        assert!(!html.contains("__NODES__"));
        assert!(!html.contains("__EDGES__"));
        assert!(!html.contains("__ACCENT__"));
        assert!(!html.contains("__EDGE__"));
        assert!(!html.contains("__BG__"));
    }

    #[test]
    fn test_style_substituted() {
        let html = render_html(&VisualModel::default(), &style()).unwrap();
        assert!(html.contains("background: #8B0000;"));
        assert!(html.contains("border: '#FFD60A'"));
        assert!(html.contains("color: { color: '#8b4513' }"));
        assert!(html.contains(template::VIS_NETWORK_URL));
    }

    #[test]
    fn test_model_embedded_as_json() {
        let model = VisualModel {
            nodes: vec![node("张三"), node("李四")],
            edges: vec![VisualEdge {
                from: "张三".to_string(),
                to: "李四".to_string(),
                label: "师徒".to_string(),
                arrows: "to".to_string(),
            }],
        };
        let html = render_html(&model, &style()).unwrap();

        let nodes: serde_json::Value = serde_json::from_str(embedded(&html, "nodesData")).unwrap();
        let edges: serde_json::Value = serde_json::from_str(embedded(&html, "edgesData")).unwrap();
        assert_eq!(nodes.as_array().unwrap().len(), 2);
        assert_eq!(nodes[0]["id"], "张三");
        assert_eq!(edges[0]["label"], "师徒");
        assert_eq!(edges[0]["arrows"], "to");
    }

    #[test]
    fn test_data_cannot_close_script_or_hit_markers() {
        let mut evil = node("</script><b>");
        evil.bio = "__EDGES__ and __ACCENT__".to_string();
        let model = VisualModel {
            nodes: vec![evil],
            edges: vec![],
        };
        let html = render_html(&model, &style()).unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("__EDGES__ and __ACCENT__"));
        assert_eq!(embedded(&html, "edgesData"), "[]");
    }

    #[test]
    fn test_detail_panel_splits_before_escaping() {
        let page = template::PAGE;
        let split = page
            .find("String(node.bio).split(/\\n|; /)")
            .expect("detail body is split on separators");
        let escape = page[split..]
            .find(".map(escapeHtml).join('<br/>')")
            .expect("each piece is escaped after the split");
        assert!(escape > 0);
        assert!(!page.contains("escapeHtml(node.bio)"));

        // Entity-producing characters followed by a space must reach the page raw
        let mut node = node("A");
        node.bio = "忠诚; A & B; students' work".to_string();
        let model = VisualModel {
            nodes: vec![node],
            edges: vec![],
        };
        let html = render_html(&model, &style()).unwrap();
        let nodes: serde_json::Value = serde_json::from_str(embedded(&html, "nodesData")).unwrap();
        assert_eq!(nodes[0]["bio"], "忠诚; A & B; students' work");
    }

    #[test]
    fn test_render_style_background_image() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("data")).unwrap();
        fs::write(temp_dir.path().join("data/custom_bg.jpg"), b"bg").unwrap();

        let mut config = Config::default();
        config.paths.root = temp_dir.path().to_path_buf();
        config.style.background_image = Some("custom_bg.jpg".to_string());
        let images = ImageResolver::from_config(&config);

        let resolved = RenderStyle::from_config(&config.style, &images);
        assert!(resolved.background.starts_with("url('data:image/jpeg;base64,"));
        assert!(resolved.background.ends_with("')"));

        config.style.background_image = Some("missing.jpg".to_string());
        let fallback = RenderStyle::from_config(&config.style, &images);
        assert_eq!(fallback.background, "#8B0000");
    }

    #[test]
    fn test_export_to_file_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exports/genealogy_export.html");
        let html = render_html(&VisualModel::default(), &style()).unwrap();

        let report = export_to_file(&html, &path).unwrap();
        assert_eq!(report.path, path);
        assert_eq!(report.bytes, html.len());
        assert_eq!(report.sha256, sha256_hex(html.as_bytes()));
        assert_eq!(report.sha256.len(), 64);
        assert_eq!(fs::read_to_string(&path).unwrap(), html);
    }

    #[test]
    fn test_export_failure_surfaces_cause() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("exports");
        fs::write(&blocker, "not a directory").unwrap();

        let err = export_to_file("<html></html>", &blocker.join("out.html")).unwrap_err();
        match err {
            LineageError::Export { path, .. } => assert_eq!(path, blocker.join("out.html")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
