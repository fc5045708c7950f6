use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::record::{FactorType, IncidentRecord};

/// A factor value observed in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorNode {
    pub label: String,
    pub factor_type: FactorType,
}

/// Undirected co-occurrence graph over factor labels.
///
/// A label is one node no matter which field produced it. The type tag is
/// the one seen first; later records offering another type for the same
/// label are ignored; [`FactorGraph::type_collisions`] counts the labels
/// this happened to. Node indices follow discovery order.
#[derive(Debug, Clone, Default)]
pub struct FactorGraph {
    graph: UnGraph<FactorNode, ()>,
    index: HashMap<String, NodeIndex>,
    collided: HashSet<String>,
}

/// Size and connectivity figures for a [`FactorGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
    pub largest_component: usize,
    pub type_collisions: usize,
}

impl FactorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the co-occurrence graph for a set of validated records.
    #[instrument(skip_all)]
    pub fn build<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> Self {
        let mut graph = FactorGraph::new();
        let mut count = 0usize;
        for record in records {
            graph.add_record(record);
            count += 1;
        }

        info!(
            records = count,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built factor graph"
        );
        graph
    }

    /// Add one record: a node per present field and an edge between every
    /// pair of adjacent present fields. A missing field breaks the chain.
    pub fn add_record(&mut self, record: &IncidentRecord) {
        let mut previous: Option<NodeIndex> = None;
        for (factor_type, value) in record.factors() {
            let current = value.map(|label| self.add_node(label, factor_type));
            if let (Some(a), Some(b)) = (previous, current) {
                self.add_edge(a, b);
            }
            previous = current;
        }
    }

    /// Look up `label`, creating it with `factor_type` if it is new.
    pub fn add_node(&mut self, label: &str, factor_type: FactorType) -> NodeIndex {
        if let Some(&idx) = self.index.get(label) {
            let existing = self.graph[idx].factor_type;
            if existing != factor_type && self.collided.insert(label.to_string()) {
                debug!(label, kept = %existing, ignored = %factor_type, "label shared by two factor types");
            }
            return idx;
        }

        let idx = self.graph.add_node(FactorNode {
            label: label.to_string(),
            factor_type,
        });
        self.index.insert(label.to_string(), idx);
        idx
    }

    /// Connect two nodes. Returns `false` for self-loops and edges that
    /// already exist, neither of which changes the graph.
    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        if a == b || self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of distinct labels that appeared under more than one type.
    pub fn type_collisions(&self) -> usize {
        self.collided.len()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn index_of(&self, label: &str) -> Option<NodeIndex> {
        self.index.get(label).copied()
    }

    pub fn node(&self, label: &str) -> Option<&FactorNode> {
        self.index_of(label).map(|idx| &self.graph[idx])
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &FactorNode> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes().map(|node| node.label.as_str())
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].label.as_str(),
                self.graph[e.target()].label.as_str(),
            )
        })
    }

    pub fn as_graph(&self) -> &UnGraph<FactorNode, ()> {
        &self.graph
    }

    /// An independent copy of this graph with `label` and its edges removed.
    ///
    /// Surviving nodes keep their relative discovery order. Returns `None`
    /// if `label` is not a node.
    pub fn without(&self, label: &str) -> Option<FactorGraph> {
        let target = self.index_of(label)?;
        let graph = self.graph.filter_map(
            |idx, node| (idx != target).then(|| node.clone()),
            |_, _| Some(()),
        );
        let index = graph
            .node_indices()
            .map(|idx| (graph[idx].label.clone(), idx))
            .collect();

        let mut collided = self.collided.clone();
        collided.remove(label);

        Some(FactorGraph {
            graph,
            index,
            collided,
        })
    }

    pub fn summary(&self) -> GraphSummary {
        let components = tarjan_scc(&self.graph);
        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            components: components.len(),
            largest_component: components.iter().map(Vec::len).max().unwrap_or(0),
            type_collisions: self.type_collisions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: [&str; 14]) -> IncidentRecord {
        IncidentRecord::from_chain(values).unwrap()
    }

    fn chain(prefix: &str) -> IncidentRecord {
        let labels: Vec<String> = (0..14).map(|i| format!("{prefix}{i}")).collect();
        let values: [&str; 14] = std::array::from_fn(|i| labels[i].as_str());
        record(values)
    }

    #[test]
    fn test_single_record_has_thirteen_edges() {
        let graph = FactorGraph::build([&chain("v")]);
        assert_eq!(graph.node_count(), 14);
        assert_eq!(graph.edge_count(), 13);

        let edges: Vec<(&str, &str)> = graph.edges().collect();
        for (i, (a, b)) in edges.iter().enumerate() {
            assert_eq!(*a, format!("v{i}"));
            assert_eq!(*b, format!("v{}", i + 1));
        }
        for (i, node) in graph.nodes().enumerate() {
            assert_eq!(node.factor_type, FactorType::CHAIN[i]);
        }
    }

    #[test]
    fn test_repeated_record_adds_nothing() {
        let r = chain("v");
        let graph = FactorGraph::build([&r, &r, &r]);
        assert_eq!(graph.node_count(), 14);
        assert_eq!(graph.edge_count(), 13);
        assert_eq!(graph.type_collisions(), 0);
    }

    #[test]
    fn test_shared_label_collapses_first_type_wins() {
        let first = record([
            "small", "fall", "scaffold", "pipe", "clamp", "building", "carpenter", "shared",
            "male", "1y", "mon", "am", "house", "5",
        ]);
        let second = record([
            "large", "slip", "ladder", "step", "rung", "civil", "driver", "40s", "female",
            "2y", "tue", "pm", "shared", "10",
        ]);
        let graph = FactorGraph::build([&first, &second]);

        assert_eq!(graph.node_count(), 27);
        assert_eq!(graph.node("shared").unwrap().factor_type, FactorType::Age);
        assert_eq!(graph.type_collisions(), 1);
    }

    #[test]
    fn test_collisions_count_labels_not_rows() {
        let first = record([
            "small", "fall", "scaffold", "pipe", "clamp", "building", "carpenter", "shared",
            "male", "1y", "mon", "am", "house", "5",
        ]);
        let second = record([
            "large", "slip", "ladder", "step", "rung", "civil", "driver", "40s", "female",
            "2y", "tue", "pm", "shared", "10",
        ]);
        let third = record([
            "large", "slip", "ladder", "step", "rung", "civil", "driver", "40s", "female",
            "2y", "tue", "pm", "house", "shared",
        ]);
        let graph = FactorGraph::build([&first, &second, &second, &third]);

        assert_eq!(graph.type_collisions(), 1);
        assert_eq!(graph.summary().type_collisions, 1);
        assert_eq!(graph.without("shared").unwrap().type_collisions(), 0);
        assert_eq!(graph.without("fall").unwrap().type_collisions(), 1);
    }

    #[test]
    fn test_adjacent_identical_values_do_not_loop() {
        let r = record([
            "same", "same", "scaffold", "pipe", "clamp", "building", "carpenter", "30s",
            "male", "1y", "mon", "am", "house", "5",
        ]);
        let graph = FactorGraph::build([&r]);
        assert_eq!(graph.node_count(), 13);
        assert_eq!(graph.edge_count(), 12);
        assert!(graph.edges().all(|(a, b)| a != b));
    }

    #[test]
    fn test_missing_optional_breaks_chain() {
        let mut r = chain("v");
        r.medium_cause = None;
        let graph = FactorGraph::build([&r]);
        assert_eq!(graph.node_count(), 13);
        assert_eq!(graph.edge_count(), 11);
        assert!(!graph.contains("v3"));
    }

    #[test]
    fn test_without_leaves_original_untouched() {
        let graph = FactorGraph::build([&chain("v")]);
        let copy = graph.without("v5").unwrap();

        assert_eq!(copy.node_count(), 13);
        assert_eq!(copy.edge_count(), 11);
        assert!(!copy.contains("v5"));
        assert_eq!(graph.node_count(), 14);
        assert_eq!(graph.edge_count(), 13);
        assert!(graph.contains("v5"));

        let order: Vec<&str> = copy.labels().collect();
        assert_eq!(order[4], "v4");
        assert_eq!(order[5], "v6");
        assert_eq!(copy.index_of("v13"), Some(NodeIndex::new(12)));
    }

    #[test]
    fn test_without_unknown_label() {
        let graph = FactorGraph::build([&chain("v")]);
        assert!(graph.without("nope").is_none());
    }

    #[test]
    fn test_summary_counts_components() {
        let graph = FactorGraph::build([&chain("a"), &chain("b")]);
        let summary = graph.summary();
        assert_eq!(summary.nodes, 28);
        assert_eq!(summary.edges, 26);
        assert_eq!(summary.components, 2);
        assert_eq!(summary.largest_component, 14);

        let split = graph.without("a7").unwrap().summary();
        assert_eq!(split.components, 3);
        assert_eq!(split.largest_component, 14);
    }

    #[test]
    fn test_summary_empty_graph() {
        let summary = FactorGraph::new().summary();
        assert_eq!(summary.components, 0);
        assert_eq!(summary.largest_component, 0);
    }
}
