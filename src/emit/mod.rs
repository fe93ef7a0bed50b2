//! Diagram text emission
//!
//! Serializes a finished [`TopologyGraph`] into D2 statements. No graph
//! logic lives here: the emitter is a pure pass over already-resolved nodes,
//! edges, metadata blocks, and layout hints.
//!
//! Document order: static preamble (root layout hint, class registry), then
//! layout hints, node declarations, edges, and metadata blocks, each section
//! in graph insertion order. A renderer does not care about statement order;
//! fixing it here makes repeated runs over an unchanged snapshot
//! byte-identical.

pub mod classes;

use crate::topo::graph::{Edge, MetadataBlock, Node, TopologyGraph};

/// Render the full diagram document for one run.
pub fn render_document(graph: &TopologyGraph) -> String {
    let mut out = String::new();

    out.push_str("namespace: { grid-columns: 1 }\n");
    render_classes(&mut out);

    for hint in graph.hints() {
        out.push_str(&format!(
            "{}: {{ grid-columns: {} }}\n",
            hint.path, hint.grid_columns
        ));
    }
    for node in graph.nodes() {
        render_node(&mut out, node);
    }
    for edge in graph.edges() {
        render_edge(&mut out, edge);
    }
    for block in graph.metadata() {
        render_metadata(&mut out, block);
    }

    out
}

fn render_classes(out: &mut String) {
    out.push_str("classes: {\n");
    for class in classes::CLASS_REGISTRY {
        out.push_str(&format!(
            "  {}: {{label: {}; icon: {}}}\n",
            class.tag, class.label, class.icon
        ));
    }
    out.push_str("}\n");
}

fn render_node(out: &mut String, node: &Node) {
    match (node.class, node.label.as_deref()) {
        (Some(class), Some(label)) => out.push_str(&format!(
            "{}: {{ class: {}; label: {} }}\n",
            node.path,
            class.tag(),
            label
        )),
        (Some(class), None) => {
            out.push_str(&format!("{}: {{ class: {} }}\n", node.path, class.tag()))
        }
        (None, Some(label)) => {
            out.push_str(&format!("{}: {{ label: {} }}\n", node.path, label))
        }
        // Bare declaration: presence without styling.
        (None, None) => out.push_str(&format!("{}\n", node.path)),
    }
}

fn render_edge(out: &mut String, edge: &Edge) {
    match edge.label.as_deref() {
        Some(label) => out.push_str(&format!("{} -> {}: {}\n", edge.from, edge.to, label)),
        None => out.push_str(&format!("{} -> {}\n", edge.from, edge.to)),
    }
}

fn render_metadata(out: &mut String, block: &MetadataBlock) {
    out.push_str(&format!("{}.extradata: |md\n", block.path));
    out.push_str(&format!("# {}\n", block.title));
    for (key, value) in &block.fields {
        out.push_str(&format!("- {key} = {value}\n"));
    }
    out.push_str("|\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topo::graph::NodeClass;
    use crate::topo::path::{KindTag, ResourcePath};

    #[test]
    fn test_node_declaration_forms() {
        let mut out = String::new();
        let path = ResourcePath::namespace("ns").child(KindTag::Service, "web-svc");

        render_node(
            &mut out,
            &Node {
                path: path.clone(),
                class: Some(NodeClass::Service),
                label: Some("Service web-svc".to_string()),
            },
        );
        assert_eq!(
            out,
            "namespace.'ns'.service.'web-svc': { class: k8s-svc; label: Service web-svc }\n"
        );

        out.clear();
        render_node(
            &mut out,
            &Node {
                path: path.clone(),
                class: None,
                label: None,
            },
        );
        assert_eq!(out, "namespace.'ns'.service.'web-svc'\n");
    }

    #[test]
    fn test_edge_forms() {
        let mut out = String::new();
        let from = ResourcePath::namespace("ns").group(KindTag::Ingress).child(KindTag::Rule, "a");
        let to = ResourcePath::namespace("ns").child(KindTag::Service, "b");

        render_edge(
            &mut out,
            &Edge {
                from: from.clone(),
                to: to.clone(),
                label: None,
            },
        );
        render_edge(
            &mut out,
            &Edge {
                from,
                to,
                label: Some("HTTP path '/'".to_string()),
            },
        );

        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("namespace.'ns'.ingress.rule.'a' -> namespace.'ns'.service.'b'")
        );
        assert_eq!(
            lines.next(),
            Some("namespace.'ns'.ingress.rule.'a' -> namespace.'ns'.service.'b': HTTP path '/'")
        );
    }

    #[test]
    fn test_metadata_block_form() {
        let mut out = String::new();
        render_metadata(
            &mut out,
            &MetadataBlock {
                path: ResourcePath::namespace("ns").child(KindTag::Deployment, "web"),
                title: "Deployment web".to_string(),
                fields: vec![("Replicas".to_string(), "2".to_string())],
            },
        );
        assert_eq!(
            out,
            "namespace.'ns'.deployment.'web'.extradata: |md\n# Deployment web\n- Replicas = 2\n|\n"
        );
    }
}
