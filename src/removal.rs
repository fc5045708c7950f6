use tracing::{info, instrument};

use crate::centrality::{compute_all, CentralityReport};
use crate::error::RemovalError;
use crate::graph::FactorGraph;
use crate::record::FactorType;
use crate::render::RenderGraph;

/// A counterfactual graph with one factor removed, and its centrality.
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub removed: String,
    pub removed_type: FactorType,
    pub graph: FactorGraph,
    pub centrality: CentralityReport,
}

impl RemovalOutcome {
    pub fn render(&self) -> RenderGraph {
        RenderGraph::new(&self.graph, &self.centrality.degree)
    }
}

/// Remove `label` from a copy of `graph` and recompute every measure.
///
/// `graph` itself is never modified, so successive calls each start from
/// the same base.
#[instrument(skip(graph))]
pub fn simulate_removal(graph: &FactorGraph, label: &str) -> Result<RemovalOutcome, RemovalError> {
    let removed_type = graph
        .node(label)
        .map(|node| node.factor_type)
        .ok_or_else(|| RemovalError::NotFound(label.to_string()))?;
    let copy = graph
        .without(label)
        .ok_or_else(|| RemovalError::NotFound(label.to_string()))?;

    let centrality = compute_all(&copy);
    info!(
        removed_type = %removed_type,
        nodes = copy.node_count(),
        edges = copy.edge_count(),
        "simulated removal"
    );

    Ok(RemovalOutcome {
        removed: label.to_string(),
        removed_type,
        graph: copy,
        centrality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::IncidentRecord;
    use proptest::prelude::*;

    fn dataset() -> FactorGraph {
        let rows = [
            [
                "small", "fall", "scaffold", "pipe", "clamp", "building", "carpenter", "50s",
                "male", "6m", "mon", "am", "house", "5",
            ],
            [
                "small", "trip", "material", "rebar", "bar", "building", "ironworker", "60s",
                "male", "1y", "tue", "pm", "house", "5",
            ],
            [
                "large", "fall", "ladder", "step", "rung", "interior", "finisher", "40s",
                "female", "6m", "wed", "am", "house", "50",
            ],
            [
                "large", "caught", "machine", "heavy", "excavator", "civil", "operator", "50s",
                "male", "3y", "thu", "pm", "bridge", "50",
            ],
        ];
        let records: Vec<IncidentRecord> = rows
            .into_iter()
            .filter_map(IncidentRecord::from_chain)
            .collect();
        FactorGraph::build(&records)
    }

    #[test]
    fn test_removal_recomputes_on_copy() {
        let base = dataset();
        let nodes = base.node_count();
        let edges = base.edge_count();

        let outcome = simulate_removal(&base, "house").unwrap();
        assert_eq!(outcome.removed_type, FactorType::Facility);
        assert_eq!(outcome.graph.node_count(), nodes - 1);
        assert!(outcome.graph.edge_count() < edges);
        assert_eq!(outcome.centrality.degree.len(), nodes - 1);
        assert_eq!(outcome.centrality.degree.get("house"), None);

        assert_eq!(base.node_count(), nodes);
        assert_eq!(base.edge_count(), edges);
    }

    #[test]
    fn test_not_found_leaves_graph_alone() {
        let base = dataset();
        let (nodes, edges) = (base.node_count(), base.edge_count());

        let err = simulate_removal(&base, "nothing").unwrap_err();
        assert_eq!(err, RemovalError::NotFound("nothing".to_string()));
        assert_eq!(err.to_string(), "Node nothing not found in the graph.");
        assert_eq!((base.node_count(), base.edge_count()), (nodes, edges));
    }

    #[test]
    fn test_successive_removals_do_not_leak() {
        let base = dataset();
        let x = simulate_removal(&base, "fall").unwrap();
        let y = simulate_removal(&base, "male").unwrap();

        assert!(y.graph.contains("fall"));
        assert!(x.graph.contains("male"));

        let fresh_x = base.clone().without("fall").unwrap();
        let fresh_y = base.clone().without("male").unwrap();
        assert_eq!(x.centrality, compute_all(&fresh_x));
        assert_eq!(y.centrality, compute_all(&fresh_y));
    }

    #[test]
    fn test_removing_hub_changes_betweenness() {
        let base = dataset();
        let before = compute_all(&base);
        let outcome = simulate_removal(&base, "house").unwrap();
        assert!(before.betweenness.get("house").unwrap() > 0.0);
        assert_ne!(
            before.betweenness.get("pm"),
            outcome.centrality.betweenness.get("pm")
        );
    }

    #[test]
    fn test_render_after_removal() {
        let outcome = simulate_removal(&dataset(), "fall").unwrap();
        let render = outcome.render();
        assert_eq!(render.nodes.len(), outcome.graph.node_count());
        assert_eq!(render.edges.len(), outcome.graph.edge_count());
        assert!(render.nodes.iter().all(|n| n.label != "fall"));
    }

    proptest! {
        #[test]
        fn removal_order_does_not_matter(a in 0usize..40, b in 0usize..40) {
            let base = dataset();
            let labels: Vec<String> = base.labels().map(str::to_string).collect();
            let x = &labels[a % labels.len()];
            let y = &labels[b % labels.len()];

            let first_x = simulate_removal(&base, x).unwrap();
            let _ = simulate_removal(&base, y).unwrap();
            let second_x = simulate_removal(&base, x).unwrap();
            prop_assert_eq!(first_x.centrality, second_x.centrality);
            prop_assert_eq!(base.node_count(), labels.len());
        }
    }
}
