//! Declarative diagram description handed to a renderer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{IacError, IacResult};

/// Category used for placeholder nodes.
pub const PLACEHOLDER_CATEGORY: &str = "blank";

/// A drawable node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    /// Category the node was built from; renderers pick shapes from it.
    pub category: String,
}

/// A labelled group of nodes and nested clusters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub label: String,
    /// Background colour hint.
    pub background: Option<String>,
    pub nodes: Vec<DiagramNode>,
    pub clusters: Vec<Cluster>,
}

impl Cluster {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_background(mut self, colour: impl Into<String>) -> Self {
        self.background = Some(colour.into());
        self
    }

    /// True when neither this cluster nor any descendant holds a node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.clusters.iter().all(Cluster::is_empty)
    }

    /// Depth-first search for a cluster by label, including `self`.
    pub fn find(&self, label: &str) -> Option<&Cluster> {
        if self.label == label {
            return Some(self);
        }
        self.clusters.iter().find_map(|c| c.find(label))
    }

    /// Every node of this cluster and its descendants, depth first.
    pub fn all_nodes(&self) -> Vec<&DiagramNode> {
        let mut nodes: Vec<&DiagramNode> = self.nodes.iter().collect();
        for cluster in &self.clusters {
            nodes.extend(cluster.all_nodes());
        }
        nodes
    }
}

/// A directed edge from one node to one or more targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEdge {
    /// Source category or role, e.g. `compute`.
    pub source: String,
    /// Target category or role, e.g. `database`.
    pub target: String,
    pub from: String,
    pub to: Vec<String>,
}

impl DiagramEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            from: from.into(),
            to,
        }
    }
}

/// A complete diagram: graph hints, a cluster tree and edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramModel {
    pub title: String,
    /// Graph-level layout hints (`pad`, `ranksep`, `splines`, ...).
    pub attributes: Vec<(String, String)>,
    /// Unlabelled root; top-level nodes live here.
    pub root: Cluster,
    pub edges: Vec<DiagramEdge>,
    #[serde(default)]
    pub placeholder: bool,
    #[serde(skip)]
    next_id: usize,
}

impl DiagramModel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            attributes: Vec::new(),
            root: Cluster::default(),
            edges: Vec::new(),
            placeholder: false,
            next_id: 0,
        }
    }

    /// A diagram whose whole body is one descriptive node.
    pub fn placeholder(title: impl Into<String>, label: impl Into<String>) -> Self {
        let mut model = Self::new(title);
        let node = model.node(PLACEHOLDER_CATEGORY, label);
        model.root.nodes.push(node);
        model.placeholder = true;
        model
    }

    pub fn with_attributes(mut self, attributes: &[(&str, &str)]) -> Self {
        self.attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    /// Create a node with a fresh id. The caller places it in a cluster.
    pub fn node(&mut self, category: &str, label: impl Into<String>) -> DiagramNode {
        let id = format!("{}_{}", category, self.next_id);
        self.next_id += 1;
        DiagramNode {
            id,
            label: label.into(),
            category: category.to_string(),
        }
    }

    /// Append an edge unless an identical one exists. Returns whether it was added.
    pub fn add_edge(&mut self, edge: DiagramEdge) -> bool {
        let duplicate = self
            .edges
            .iter()
            .any(|e| e.from == edge.from && e.to == edge.to);
        if duplicate || edge.to.is_empty() {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn find_cluster(&self, label: &str) -> Option<&Cluster> {
        self.root.find(label)
    }

    pub fn nodes(&self) -> Vec<&DiagramNode> {
        self.root.all_nodes()
    }

    /// Check node ids are unique and every edge endpoint exists.
    pub fn validate(&self) -> IacResult<()> {
        let mut ids = HashSet::new();
        for node in self.nodes() {
            if !ids.insert(node.id.as_str()) {
                return Err(IacError::Composition(format!("duplicate node id '{}'", node.id)));
            }
        }

        for edge in &self.edges {
            for endpoint in std::iter::once(&edge.from).chain(&edge.to) {
                if !ids.contains(endpoint.as_str()) {
                    return Err(IacError::Composition(format!(
                        "edge {} -> {} references unknown node '{}'",
                        edge.source, edge.target, endpoint
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Label used when a provider has no diagram support.
pub fn unsupported_label(provider: &str) -> String {
    format!("Diagrams for {} not implemented.", provider.to_uppercase())
}

/// Keep a composed diagram if it is valid, otherwise fall back to a placeholder
/// carrying the failure.
pub(crate) fn finish(title: &str, composed: IacResult<DiagramModel>) -> DiagramModel {
    match composed.and_then(|model| model.validate().map(|_| model)) {
        Ok(model) => model,
        Err(e) => {
            warn!("Could not compose '{}': {}", title, e);
            DiagramModel::placeholder(title, format!("Error: {}", e))
        }
    }
}
