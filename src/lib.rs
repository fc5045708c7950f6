//! Co-occurrence graph analysis of construction accident factors.
//!
//! Incident records are turned into an undirected graph whose nodes are
//! factor values (project scale, accident type, cause, worker profile,
//! timing, facility) and whose edges link values that sit next to each
//! other in one record. Degree, closeness and betweenness centrality rank
//! the factors, and [`removal::simulate_removal`] shows how the ranking
//! shifts when one factor is taken out of the network.
//!
//! ```text
//! CSV rows ── record::read_records ──▶ IncidentRecord
//!          ── graph::FactorGraph::build ──▶ FactorGraph
//!          ── centrality::compute_all ──▶ CentralityReport
//!          ── ranking::RankingReport ──▶ top-K lists
//! ```
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums in [`error`]; the binaries use `anyhow`.
//! - **Logging**: `tracing` macros; the subscriber is installed by `main`.

pub mod centrality;
pub mod error;
pub mod graph;
pub mod ranking;
pub mod record;
pub mod removal;
pub mod render;
pub mod session;
