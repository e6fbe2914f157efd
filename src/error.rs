use thiserror::Error;

/// Precondition violations raised by the audit pipeline.
///
/// Sparse or degenerate data never produces one of these; stages return
/// empty or neutral results instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuditError {
    #[error("trade #{index}: required field `{field}` is missing")]
    MissingField { index: usize, field: &'static str },

    #[error("trade #{index}: field `{field}` is invalid ({reason})")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("trade #{index} ({symbol}): close time precedes open time")]
    InvalidTimeRange { index: usize, symbol: String },

    #[error("trade #{index} closes before its predecessor; sequence must be sorted by close time")]
    Unordered { index: usize },

    #[error("trade #{index} has no cluster assignment; run clustering first")]
    NotClustered { index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
