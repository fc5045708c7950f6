//! Degree, closeness and betweenness centrality over a [`FactorGraph`].
//!
//! All three measures treat the graph as simple, undirected and unweighted,
//! and are normalized the way networkx normalizes them so scores from
//! graphs of different sizes can be compared:
//!
//! | Measure     | Score for node `v`                                        |
//! |-------------|-----------------------------------------------------------|
//! | Degree      | `deg(v) / (n - 1)`                                        |
//! | Closeness   | `(r - 1) / Σ d(v, u)` scaled by `(r - 1) / (n - 1)`        |
//! | Betweenness | `Σ σ_st(v) / σ_st` over unordered pairs, × `2/((n-1)(n-2))` |
//!
//! where `r` is the number of nodes reachable from `v` (itself included).
//! Degenerate graphs (fewer than two or three nodes, isolated nodes) score
//! 0.0 rather than dividing by zero.
//!
//! Every computation walks nodes in index order and accumulates in a fixed
//! order, so the same graph always produces bit-identical scores.

use std::collections::VecDeque;
use std::fmt;

use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::FactorGraph;

/// One score per node, in the graph's discovery order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct CentralityResult {
    entries: Vec<(String, f64)>,
}

impl CentralityResult {
    fn from_scores(graph: &FactorGraph, scores: Vec<f64>) -> Self {
        let entries = graph
            .labels()
            .map(str::to_string)
            .zip(scores)
            .collect();
        CentralityResult { entries }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, score)| *score)
    }

    /// Score of the node at `position` in discovery order.
    pub fn score_at(&self, position: usize) -> Option<f64> {
        self.entries.get(position).map(|(_, score)| *score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(l, s)| (l.as_str(), *s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Measure {
    Degree,
    Betweenness,
    Closeness,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Degree, Measure::Betweenness, Measure::Closeness];

    pub fn title(self) -> &'static str {
        match self {
            Measure::Degree => "Degree Centrality",
            Measure::Betweenness => "Betweenness Centrality",
            Measure::Closeness => "Closeness Centrality",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The three measures computed for one graph instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityReport {
    pub degree: CentralityResult,
    pub betweenness: CentralityResult,
    pub closeness: CentralityResult,
}

impl CentralityReport {
    pub fn get(&self, measure: Measure) -> &CentralityResult {
        match measure {
            Measure::Degree => &self.degree,
            Measure::Betweenness => &self.betweenness,
            Measure::Closeness => &self.closeness,
        }
    }
}

/// Compute every measure for `graph`.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn compute_all(graph: &FactorGraph) -> CentralityReport {
    let report = CentralityReport {
        degree: degree_centrality(graph),
        betweenness: betweenness_centrality(graph),
        closeness: closeness_centrality(graph),
    };
    debug!("centrality computed");
    report
}

/// Fraction of the other nodes each node is adjacent to.
#[allow(clippy::cast_precision_loss)]
pub fn degree_centrality(graph: &FactorGraph) -> CentralityResult {
    let g = graph.as_graph();
    let n = g.node_count();
    let scale = if n > 1 { 1.0 / (n - 1) as f64 } else { 0.0 };

    let scores = g
        .node_indices()
        .map(|idx| g.neighbors(idx).count() as f64 * scale)
        .collect();
    CentralityResult::from_scores(graph, scores)
}

/// BFS hop counts from `source`; `None` for unreachable nodes.
fn distances_from(graph: &FactorGraph, source: NodeIndex) -> Vec<Option<usize>> {
    let g = graph.as_graph();
    let mut dist = vec![None; g.node_count()];
    dist[source.index()] = Some(0);

    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        let next = dist[v.index()].map_or(0, |d| d + 1);
        for w in g.neighbors(v) {
            if dist[w.index()].is_none() {
                dist[w.index()] = Some(next);
                queue.push_back(w);
            }
        }
    }
    dist
}

/// Closeness with the Wasserman–Faust correction for disconnected graphs.
#[instrument(skip_all)]
#[allow(clippy::cast_precision_loss)]
pub fn closeness_centrality(graph: &FactorGraph) -> CentralityResult {
    let g = graph.as_graph();
    let n = g.node_count();

    let scores = g
        .node_indices()
        .map(|idx| {
            let dist = distances_from(graph, idx);
            let (reachable, total) = dist
                .iter()
                .flatten()
                .fold((0usize, 0usize), |(r, t), d| (r + 1, t + d));

            if total == 0 || n <= 1 {
                return 0.0;
            }
            let others = (reachable - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        })
        .collect();
    CentralityResult::from_scores(graph, scores)
}

/// Normalized betweenness via Brandes' algorithm.
///
/// For each source `s` a BFS records shortest-path counts (`sigma`) and
/// predecessor lists; dependencies are then accumulated in reverse BFS
/// order. Summing over every source visits each unordered pair twice, which
/// the `1 / ((n-1)(n-2))` rescale folds into the undirected `2 / ...` factor.
///
/// Complexity: O(V * E).
#[instrument(skip_all)]
#[allow(clippy::cast_precision_loss)]
pub fn betweenness_centrality(graph: &FactorGraph) -> CentralityResult {
    let g = graph.as_graph();
    let n = g.node_count();

    // Node-indexed accumulator.
    let mut cb: Vec<f64> = vec![0.0; n];

    for s in g.node_indices() {
        let si = s.index();

        // Nodes in order of discovery; popped farthest first.
        let mut stack: Vec<NodeIndex> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];

        let mut sigma: Vec<f64> = vec![0.0; n];
        sigma[si] = 1.0;

        let mut dist: Vec<i64> = vec![-1; n];
        dist[si] = 0;

        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            let vi = v.index();
            stack.push(v);

            for w in g.neighbors(v) {
                let wi = w.index();

                if dist[wi] < 0 {
                    dist[wi] = dist[vi] + 1;
                    queue.push_back(w);
                }

                if dist[wi] == dist[vi] + 1 {
                    sigma[wi] += sigma[vi];
                    predecessors[wi].push(v);
                }
            }
        }

        let mut delta: Vec<f64> = vec![0.0; n];

        while let Some(w) = stack.pop() {
            let wi = w.index();

            for &v in &predecessors[wi] {
                let vi = v.index();
                delta[vi] += (sigma[vi] / sigma[wi]) * (1.0 + delta[wi]);
            }

            if wi != si {
                cb[wi] += delta[wi];
            }
        }
    }

    let scale = if n > 2 {
        1.0 / ((n - 1) * (n - 2)) as f64
    } else {
        0.0
    };
    for score in &mut cb {
        *score *= scale;
    }

    CentralityResult::from_scores(graph, cb)
}
