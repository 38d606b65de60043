//! Error types for loading, screening and comparison.

use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while building or querying a dataset.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A base relation could not be loaded; fatal to the session
    #[error("Data unavailable: {relation}: {reason}")]
    DataUnavailable {
        /// Name of the relation that failed to load
        relation: String,
        /// Why the relation is unusable
        reason: String,
    },

    /// A screening criterion needs columns the dataset does not carry
    #[error("Criterion '{criterion}' is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        /// Criterion that could not be evaluated
        criterion: String,
        /// Absent column names
        columns: Vec<String>,
    },

    /// A comparison was requested with a company count other than two
    #[error("Comparison requires exactly two CVRs, got {0}")]
    InvalidComparisonArity(usize),

    /// Named-metric comparison with a metric outside the allowed set
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Screening requested with an unregistered criterion name
    #[error("Unknown screening criterion: {0}")]
    UnknownCriterion(String),

    /// Configuration or payload JSON could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error outside the base relations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// SQLite storage error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl AnalysisError {
    /// Shorthand for a [`AnalysisError::DataUnavailable`] error.
    pub fn unavailable(relation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            relation: relation.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error must abort the whole analysis session.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. } | Self::Sqlite(_))
    }
}
