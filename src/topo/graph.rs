//! Graph data structures for the namespace topology
//!
//! This module provides structures to represent cluster resources and their
//! relationships as an explicit graph: a node table keyed by canonical path,
//! an edge list, metadata blocks, and layout hints. The builder fills it in
//! traversal order; the emitter serializes it without any further graph
//! logic.

use std::collections::HashMap;

use crate::topo::path::ResourcePath;

/// Visual class tags understood by the emitter's class registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Namespace,
    Ingress,
    Service,
    Deployment,
    StatefulSet,
    DaemonSet,
    ConfigMap,
    Secret,
    Autoscaler,
    DisruptionBudget,
    VolumeClaim,
}

impl NodeClass {
    /// The class tag referenced by node declarations and registered in the
    /// emitter's class registry.
    pub fn tag(self) -> &'static str {
        match self {
            NodeClass::Namespace => "k8s-ns",
            NodeClass::Ingress => "k8s-ingress",
            NodeClass::Service => "k8s-svc",
            NodeClass::Deployment => "k8s-deployment",
            NodeClass::StatefulSet => "k8s-statefulset",
            NodeClass::DaemonSet => "k8s-daemonset",
            NodeClass::ConfigMap => "k8s-configmap",
            NodeClass::Secret => "k8s-secret",
            NodeClass::Autoscaler => "k8s-hpa",
            NodeClass::DisruptionBudget => "k8s-pdb",
            NodeClass::VolumeClaim => "k8s-pvc",
        }
    }
}

/// A node in the topology graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Canonical path; unique within the graph.
    pub path: ResourcePath,
    /// Visual class tag; a bare marker node has none.
    pub class: Option<NodeClass>,
    /// Optional display label.
    pub label: Option<String>,
}

/// A directed edge between two canonical paths.
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: ResourcePath,
    pub to: ResourcePath,
    /// Optional edge label (HTTP path, exposed ports).
    pub label: Option<String>,
}

/// A multi-line annotated block attached to one node.
#[derive(Debug, Clone)]
pub struct MetadataBlock {
    pub path: ResourcePath,
    pub title: String,
    /// Key/value rows in insertion order. Duplicate keys are permitted and
    /// read last-write-wins by consumers.
    pub fields: Vec<(String, String)>,
}

/// A cosmetic layout hint for the downstream renderer.
#[derive(Debug, Clone)]
pub struct LayoutHint {
    pub path: ResourcePath,
    pub grid_columns: u32,
}

/// A graph representing one run's namespace topologies.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    edges: Vec<Edge>,
    metadata: Vec<MetadataBlock>,
    metadata_index: HashMap<String, usize>,
    hints: Vec<LayoutHint>,
}

impl TopologyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node, keyed by its canonical path.
    ///
    /// Declaration is idempotent: the same resource reached through two
    /// traversal entry points keeps its first declaration, and the
    /// re-declaration is a no-op. Returns true if the node was new.
    pub fn declare(&mut self, node: Node) -> bool {
        let key = node.path.to_string();
        if self.node_index.contains_key(&key) {
            return false;
        }
        self.node_index.insert(key, self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Whether a node with this canonical path has been declared.
    pub fn contains(&self, path: &ResourcePath) -> bool {
        self.node_index.contains_key(&path.to_string())
    }

    /// Add a directed edge. Edges are not deduplicated.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Attach a metadata block to a path. A later block for the same path
    /// replaces the earlier one.
    pub fn attach_metadata(&mut self, block: MetadataBlock) {
        let key = block.path.to_string();
        match self.metadata_index.get(&key) {
            Some(&index) => self.metadata[index] = block,
            None => {
                self.metadata_index.insert(key, self.metadata.len());
                self.metadata.push(block);
            }
        }
    }

    /// Record a layout hint.
    pub fn add_hint(&mut self, hint: LayoutHint) {
        self.hints.push(hint);
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Metadata blocks in attachment order.
    pub fn metadata(&self) -> &[MetadataBlock] {
        &self.metadata
    }

    /// Layout hints in insertion order.
    pub fn hints(&self) -> &[LayoutHint] {
        &self.hints
    }
}
