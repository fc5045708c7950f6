use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::centrality::{compute_all, CentralityReport};
use crate::error::{IngestError, RemovalError};
use crate::graph::{FactorGraph, GraphSummary};
use crate::ranking::RankingReport;
use crate::record::{read_records, FactorType, IncidentRecord};
use crate::removal::{simulate_removal, RemovalOutcome};
use crate::render::RenderGraph;

/// One analyst session: the base graph and its centrality, built once.
#[derive(Debug)]
pub struct Session {
    graph: FactorGraph,
    baseline: CentralityReport,
    dropped: usize,
}

impl Session {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let ingested = read_records(path)?;
        let mut session = Session::from_records(&ingested.records);
        session.dropped = ingested.dropped;
        Ok(session)
    }

    pub fn from_records(records: &[IncidentRecord]) -> Self {
        let graph = FactorGraph::build(records);
        let summary = graph.summary();
        info!(
            nodes = summary.nodes,
            edges = summary.edges,
            components = summary.components,
            largest_component = summary.largest_component,
            type_collisions = summary.type_collisions,
            "graph summary"
        );

        let baseline = compute_all(&graph);
        Session {
            graph,
            baseline,
            dropped: 0,
        }
    }

    pub fn graph(&self) -> &FactorGraph {
        &self.graph
    }

    pub fn baseline(&self) -> &CentralityReport {
        &self.baseline
    }

    /// Rows discarded at ingestion for missing required fields.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn simulate(&self, label: &str) -> Result<RemovalOutcome, RemovalError> {
        simulate_removal(&self.graph, label)
    }

    pub fn report(&self, k: usize) -> BaselineReport {
        BaselineReport {
            dropped_rows: self.dropped,
            summary: self.graph.summary(),
            ranking: RankingReport::new(&self.baseline, k),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BaselineReport {
    pub dropped_rows: usize,
    pub summary: GraphSummary,
    pub ranking: RankingReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovalReport {
    pub removed: String,
    pub removed_type: FactorType,
    pub summary: GraphSummary,
    pub ranking: RankingReport,
    pub graph: RenderGraph,
}

impl RemovalReport {
    pub fn new(outcome: &RemovalOutcome, k: usize) -> Self {
        RemovalReport {
            removed: outcome.removed.clone(),
            removed_type: outcome.removed_type,
            summary: outcome.graph.summary(),
            ranking: RankingReport::new(&outcome.centrality, k),
            graph: outcome.render(),
        }
    }
}
