//! Error types for the drill engine.
//!
//! Only configuration and persistence can fail. Malformed answer edits are
//! not errors: the classifier rejects them from the field and moves on.

use thiserror::Error;

use crate::problem::OperatorFamily;

/// A session configuration that must not be started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("session duration must be positive")]
    NonPositiveDuration,

    #[error("at least one operator must be enabled")]
    EmptyOperators,

    #[error("{family} range is inverted: {field} min {min} is greater than max {max}")]
    InvertedRange {
        family: OperatorFamily,
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{family} range needs min_b >= 2 to keep divisors non-zero, got {min_b}")]
    DivisorTooSmall { family: OperatorFamily, min_b: i64 },

    #[error("{family} range is too large: answers would not fit in 64 bits")]
    RangeTooLarge { family: OperatorFamily },
}

/// Failure to hand a finished summary to a sink.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not encode session history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Rejected(String),
}
