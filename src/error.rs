use thiserror::Error;

/// Reasons a record's score cannot be used. None of these abort a pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("missing {field} field")]
    MissingField { field: &'static str },

    #[error("'{text}' is not a number")]
    UnparseableNumber { text: String },

    #[error("possible value is not positive")]
    ZeroDenominator,
}

pub type ScoreResult<T> = std::result::Result<T, ScoreError>;
