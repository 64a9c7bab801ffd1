use thiserror::Error;

/// Canonical result for the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the aggregation/exchange core.
///
/// `Config` and `PlanValidation` are deterministic and never retried:
/// the first is raised at function-registration time, the second at
/// plan-validation time, both before any row is processed. `Transport`
/// carries the attempt count after the bounded retry policy has been
/// exhausted. `Domain` aborts only the issuing query.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Plan validation failed: {0}")]
    PlanValidation(String),

    #[error("Aggregation domain error: {0}")]
    Domain(String),

    #[error("Exchange transport failed after {attempts} attempts: {message}")]
    Transport { attempts: usize, message: String },

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    /// Only transient transport failures may be retried; configuration,
    /// validation, and domain errors are deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Invariant(format!("wire encoding: {e}"))
    }
}
