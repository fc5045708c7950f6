use std::fs;
use std::path::Path;

use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::centrality::CentralityResult;
use crate::graph::{FactorGraph, FactorNode};
use crate::record::FactorType;

/// Node size for a degree centrality of 1.0.
pub const SIZE_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub label: String,
    pub factor_type: FactorType,
    pub color: String,
    pub size: f64,
}

/// Everything a drawing front end needs: coloured, sized nodes and edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<(String, String)>,
    pub legend: Vec<(FactorType, &'static str)>,
}

impl RenderGraph {
    /// `degree` must have been computed on `graph`, so that its entries
    /// line up with the graph's nodes.
    pub fn new(graph: &FactorGraph, degree: &CentralityResult) -> Self {
        let nodes = graph
            .nodes()
            .enumerate()
            .map(|(position, node)| RenderNode {
                label: node.label.clone(),
                factor_type: node.factor_type,
                color: node.factor_type.color().to_string(),
                size: node_size(degree, position),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();

        RenderGraph {
            nodes,
            edges,
            legend: legend(),
        }
    }
}

pub fn legend() -> Vec<(FactorType, &'static str)> {
    FactorType::CHAIN.iter().map(|t| (*t, t.color())).collect()
}

fn node_size(degree: &CentralityResult, position: usize) -> f64 {
    SIZE_SCALE * degree.score_at(position).unwrap_or(0.0)
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Graphviz source for `graph`, laid out by neato in Kamada-Kawai mode.
///
/// Nodes are filled with their factor type's colour and sized by degree
/// centrality.
pub fn to_dot(graph: &FactorGraph, degree: &CentralityResult) -> String {
    let g = graph.as_graph();
    let node_attrs = |_, (idx, node): (NodeIndex, &FactorNode)| {
        // Width in inches.
        let width = 0.2 + node_size(degree, idx.index()) / SIZE_SCALE;
        format!(
            "label=\"{}\" style=filled fillcolor=\"{}\" width={:.3} fontsize=8",
            escape(&node.label),
            node.factor_type.color(),
            width
        )
    };
    let body = Dot::with_attr_getters(
        g,
        &[
            Config::NodeNoLabel,
            Config::EdgeNoLabel,
            Config::GraphContentOnly,
        ],
        &|_, _| "color=\"gray\"".to_string(),
        &node_attrs,
    );

    format!(
        "graph {{\n    layout=neato\n    mode=KK\n    overlap=false\n    node [shape=circle]\n{:?}}}\n",
        body
    )
}

pub fn export_to_graphvis(
    graph: &FactorGraph,
    degree: &CentralityResult,
    filename: impl AsRef<Path>,
) -> std::io::Result<()> {
    fs::write(filename, to_dot(graph, degree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::degree_centrality;

    fn small() -> FactorGraph {
        let mut g = FactorGraph::new();
        let hub = g.add_node("hub \"main\"", FactorType::Facility);
        let a = g.add_node("a", FactorType::Age);
        let b = g.add_node("b", FactorType::Gender);
        g.add_edge(hub, a);
        g.add_edge(hub, b);
        g
    }

    #[test]
    fn test_render_sizes_follow_degree() {
        let g = small();
        let render = RenderGraph::new(&g, &degree_centrality(&g));
        assert_eq!(render.nodes[0].size, 1000.0);
        assert_eq!(render.nodes[1].size, 500.0);
        assert_eq!(render.nodes[0].color, "#ff7f00");
        assert_eq!(render.nodes[2].factor_type, FactorType::Gender);
        assert_eq!(render.edges.len(), 2);
        assert_eq!(render.legend.len(), 14);
    }

    #[test]
    fn test_dot_output() {
        let g = small();
        let dot = to_dot(&g, &degree_centrality(&g));
        assert!(dot.starts_with("graph {\n"));
        assert!(dot.contains("mode=KK"));
        assert!(dot.contains("label=\"hub \\\"main\\\"\""));
        assert!(dot.contains("fillcolor=\"#b3b3b3\""));
        assert!(dot.contains("fillcolor=\"#ff7f00\" width=1.200"));
        assert!(dot.contains("width=0.700"));
        assert_eq!(dot.matches(" -- ").count(), 2);
        assert!(dot.trim_end().ends_with('}'));
    }
}
