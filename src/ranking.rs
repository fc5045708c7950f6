use std::fmt::Write as _;

use serde::Serialize;

use crate::centrality::{CentralityReport, CentralityResult, Measure};

pub const DEFAULT_TOP_K: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFactor {
    pub label: String,
    pub score: f64,
}

/// The `k` highest-scoring entries, best first.
///
/// The sort is stable, so equal scores keep discovery order.
pub fn top_k(result: &CentralityResult, k: usize) -> Vec<RankedFactor> {
    let mut ranked: Vec<RankedFactor> = result
        .iter()
        .map(|(label, score)| RankedFactor {
            label: label.to_string(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(k);
    ranked
}

/// Top-K lists for every measure of one graph instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingReport {
    pub degree: Vec<RankedFactor>,
    pub betweenness: Vec<RankedFactor>,
    pub closeness: Vec<RankedFactor>,
}

impl RankingReport {
    pub fn new(report: &CentralityReport, k: usize) -> Self {
        RankingReport {
            degree: top_k(&report.degree, k),
            betweenness: top_k(&report.betweenness, k),
            closeness: top_k(&report.closeness, k),
        }
    }

    pub fn get(&self, measure: Measure) -> &[RankedFactor] {
        match measure {
            Measure::Degree => &self.degree,
            Measure::Betweenness => &self.betweenness,
            Measure::Closeness => &self.closeness,
        }
    }

    /// Plain-text listing, one block per measure.
    pub fn to_text(&self, k: usize) -> String {
        let mut out = String::new();
        for measure in Measure::ALL {
            out.push_str(&format_ranking(measure, k, self.get(measure)));
        }
        out
    }
}

pub fn format_ranking(measure: Measure, k: usize, ranked: &[RankedFactor]) -> String {
    let mut out = format!("Top {k} nodes by {measure}:\n");
    for entry in ranked {
        let _ = writeln!(out, "Node: {}, {measure}: {:.4}", entry.label, entry.score);
    }
    out
}
