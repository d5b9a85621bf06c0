//! Error types for quakezone.

use thiserror::Error;

/// Errors returned by fallible quakezone operations.
///
/// Expected per-record conditions are not errors: out-of-bounds inserts
/// return `false`, empty feature indexes use their fallback distance, and
/// unknown plate zones score as neutral.
#[derive(Debug, Error)]
pub enum QuakeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(String),
}

pub type Result<T> = std::result::Result<T, QuakeError>;
