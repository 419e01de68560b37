//! Error taxonomy shared by the model, the search and the collaborator boundary.

use thiserror::Error;

/// Errors raised while building, solving or reporting a routing instance.
#[derive(Debug, Error)]
pub enum Error {
    /// The instance is inconsistent (capacity totals, matrix shape, vehicle count).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Construction could not produce a feasible assignment despite a valid model.
    #[error("infeasible instance: {0}")]
    InfeasibleInstance(String),

    /// A cost-matrix or polyline collaborator failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// Extraction was requested before a search completed.
    #[error("no solution available: the search has not completed")]
    EmptySolution,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Provider(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
