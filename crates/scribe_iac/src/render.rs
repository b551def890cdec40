//! Diagram rendering.
//!
//! The builders only describe diagrams; a [`DiagramRenderer`] turns a
//! [`DiagramModel`] into a file. [`DotRenderer`] writes Graphviz DOT source.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::diagram::{Cluster, DiagramModel, DiagramNode};
use crate::error::{IacError, IacResult};

/// Something that can turn a diagram into a file.
pub trait DiagramRenderer {
    /// Render `model` to a file named after `stem`, returning its path.
    fn render(&self, model: &DiagramModel, stem: &str) -> IacResult<PathBuf>;

    /// Path a render of `stem` would produce.
    fn target(&self, stem: &str) -> PathBuf;
}

/// Writes `<stem>.dot` files into a directory.
#[derive(Debug, Clone)]
pub struct DotRenderer {
    output_dir: PathBuf,
}

impl DotRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// DOT source for a diagram.
    pub fn to_dot(model: &DiagramModel) -> String {
        let mut out = String::new();
        out.push_str(&format!("digraph {} {{\n", quote(&model.title)));
        out.push_str(&format!("  label={};\n", quote(&model.title)));
        out.push_str("  labelloc=t;\n");
        for (key, value) in &model.attributes {
            out.push_str(&format!("  {}={};\n", key, quote(value)));
        }
        out.push_str("  node [shape=box, style=rounded];\n");

        let mut counter = 0;
        write_cluster_body(&mut out, &model.root, 1, &mut counter);

        for edge in &model.edges {
            for target in &edge.to {
                out.push_str(&format!("  {} -> {};\n", quote(&edge.from), quote(target)));
            }
        }
        out.push_str("}\n");
        out
    }
}

impl DiagramRenderer for DotRenderer {
    fn render(&self, model: &DiagramModel, stem: &str) -> IacResult<PathBuf> {
        if stem.is_empty() || stem.contains(['/', '\\']) {
            return Err(IacError::Render(format!("invalid diagram name '{}'", stem)));
        }
        fs::create_dir_all(&self.output_dir)?;
        let path = self.target(stem);
        fs::write(&path, Self::to_dot(model))?;
        info!("Wrote diagram {}", path.display());
        Ok(path)
    }

    fn target(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.dot", stem))
    }
}

fn write_node(out: &mut String, node: &DiagramNode, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!(
        "{}{} [label={}, class={}];\n",
        indent,
        quote(&node.id),
        quote(&node.label),
        quote(&node.category)
    ));
}

fn write_cluster_body(out: &mut String, cluster: &Cluster, depth: usize, counter: &mut usize) {
    for node in &cluster.nodes {
        write_node(out, node, depth);
    }
    for child in &cluster.clusters {
        let indent = "  ".repeat(depth);
        out.push_str(&format!("{}subgraph cluster_{} {{\n", indent, counter));
        *counter += 1;
        out.push_str(&format!("{}  label={};\n", indent, quote(&child.label)));
        if let Some(colour) = &child.background {
            out.push_str(&format!("{}  style=filled;\n", indent));
            out.push_str(&format!("{}  fillcolor={};\n", indent, quote(colour)));
        }
        write_cluster_body(out, child, depth + 1, counter);
        out.push_str(&format!("{}}}\n", indent));
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Outcome of rendering one diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramArtifact {
    pub path: PathBuf,
    /// The file shows a placeholder rather than the requested diagram.
    pub placeholder: bool,
    /// False when nothing could be written.
    pub rendered: bool,
}

/// Render a diagram, falling back to a placeholder carrying the error text.
/// Never fails; check [`DiagramArtifact::rendered`].
pub fn render_artifact(renderer: &dyn DiagramRenderer, model: &DiagramModel, stem: &str) -> DiagramArtifact {
    match renderer.render(model, stem) {
        Ok(path) => DiagramArtifact {
            path,
            placeholder: model.is_placeholder(),
            rendered: true,
        },
        Err(e) => {
            warn!("Rendering '{}' failed: {}", model.title, e);
            let fallback = DiagramModel::placeholder(model.title.clone(), format!("Error: {}", e));
            match renderer.render(&fallback, stem) {
                Ok(path) => DiagramArtifact {
                    path,
                    placeholder: true,
                    rendered: true,
                },
                Err(e) => {
                    warn!("Placeholder for '{}' could not be written: {}", model.title, e);
                    DiagramArtifact {
                        path: renderer.target(stem),
                        placeholder: true,
                        rendered: false,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramEdge;
    use std::cell::Cell;
    use tempfile::tempdir;

    fn sample() -> DiagramModel {
        let mut model = DiagramModel::new("Sample \"quoted\"").with_attributes(&[("pad", "0.5")]);
        let a = model.node("compute", "web");
        let b = model.node("database", "db");
        let mut cluster = Cluster::new("Private Subnets").with_background("lightgrey");
        cluster.nodes.push(b.clone());
        model.root.nodes.push(a.clone());
        model.root.clusters.push(cluster);
        model.add_edge(DiagramEdge::new("compute", "database", a.id, vec![b.id]));
        model
    }

    #[test]
    fn test_dot_output() {
        let dot = DotRenderer::to_dot(&sample());

        assert!(dot.starts_with("digraph \"Sample \\\"quoted\\\"\" {"));
        assert!(dot.contains("pad=\"0.5\";"));
        assert!(dot.contains("subgraph cluster_0 {"));
        assert!(dot.contains("fillcolor=\"lightgrey\";"));
        assert!(dot.contains("\"compute_0\" -> \"database_1\";"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_dot_layout() {
        let expected = r#"digraph "Sample \"quoted\"" {
  label="Sample \"quoted\"";
  labelloc=t;
  pad="0.5";
  node [shape=box, style=rounded];
  "compute_0" [label="web", class="compute"];
  subgraph cluster_0 {
    label="Private Subnets";
    style=filled;
    fillcolor="lightgrey";
    "database_1" [label="db", class="database"];
  }
  "compute_0" -> "database_1";
}
"#;
        assert_eq!(DotRenderer::to_dot(&sample()), expected);
    }

    #[test]
    fn test_render_writes_file() {
        let dir = tempdir().unwrap();
        let renderer = DotRenderer::new(dir.path().join("out"));

        let artifact = render_artifact(&renderer, &sample(), "architecture");

        assert!(artifact.rendered);
        assert!(!artifact.placeholder);
        assert_eq!(artifact.path, dir.path().join("out").join("architecture.dot"));
        let content = fs::read_to_string(&artifact.path).unwrap();
        assert!(content.contains("label=\"web\""));
    }

    #[test]
    fn test_invalid_stem_is_not_rendered() {
        let dir = tempdir().unwrap();
        let renderer = DotRenderer::new(dir.path());

        let artifact = render_artifact(&renderer, &sample(), "../escape");
        assert!(!artifact.rendered);
        assert!(artifact.placeholder);
    }

    /// Fails the first render, succeeds afterwards.
    struct Flaky {
        inner: DotRenderer,
        calls: Cell<usize>,
    }

    impl DiagramRenderer for Flaky {
        fn render(&self, model: &DiagramModel, stem: &str) -> IacResult<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() == 1 {
                return Err(IacError::Render("layout engine crashed".to_string()));
            }
            self.inner.render(model, stem)
        }

        fn target(&self, stem: &str) -> PathBuf {
            self.inner.target(stem)
        }
    }

    #[test]
    fn test_failed_render_falls_back_to_placeholder() {
        let dir = tempdir().unwrap();
        let renderer = Flaky {
            inner: DotRenderer::new(dir.path()),
            calls: Cell::new(0),
        };

        let artifact = render_artifact(&renderer, &sample(), "network");

        assert!(artifact.rendered);
        assert!(artifact.placeholder);
        let content = fs::read_to_string(artifact.path).unwrap();
        assert!(content.contains("Error: Diagram rendering failed: layout engine crashed"));
    }
}
