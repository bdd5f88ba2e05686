//! Error types for VaR estimation

use thiserror::Error;

/// Errors that can occur while building returns or estimating VaR
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VarError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error(
        "Weight mismatch: assets without a weight {missing:?}, \
         weights without returns {unexpected:?}"
    )]
    WeightMismatch {
        /// Assets that have returns but no weight
        missing: Vec<String>,

        /// Weights for assets that have no returns
        unexpected: Vec<String>,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty tail: no returns at or below the VaR threshold {threshold}")]
    EmptyTail {
        /// The VaR fraction used as the tail cutoff
        threshold: f64,
    },
}

pub type Result<T> = std::result::Result<T, VarError>;
