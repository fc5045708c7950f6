use std::path::PathBuf;

use crate::record::FactorType;

/// Errors raised while turning the incident dataset into records.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open dataset {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed row in dataset: {0}")]
    Csv(#[from] csv::Error),

    /// A required column was empty. Callers filter these rows out.
    #[error("required field {0} is missing")]
    MissingField(FactorType),
}

/// Errors raised by the removal simulator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemovalError {
    #[error("Node {0} not found in the graph.")]
    NotFound(String),
}
