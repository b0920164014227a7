use thiserror::Error;

/// Errors raised while validating inputs or configuring a scorer.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// A table or the alpha vector does not have the size implied by the declared dimensions.
    #[error("dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A genotype code outside {0,1,2} (observed) or {0,1} (candidate nodes).
    #[error("invalid genotype {value} in {table} table at row {row}, column {column}")]
    InvalidGenotype {
        table: &'static str,
        row: usize,
        column: usize,
        value: i32,
    },

    /// An error rate outside the open interval (0, 1).
    #[error("{parameter} must lie strictly between 0 and 1, got {value}")]
    DomainError { parameter: &'static str, value: f64 },

    #[error("candidate node set is empty, best attachment is undefined")]
    EmptyCandidateSet,

    #[error("malformed scorer configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("could not read scorer configuration: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
