//! Error types
//!
//! Misconfiguration and misuse are reported immediately; an episode ending in
//! a collision is a normal terminal state, not an error.

/// Errors surfaced by the environment and its configuration layer.
#[derive(thiserror::Error, Debug)]
pub enum DuetError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown {kind} '{value}'")]
    UnknownMode { kind: &'static str, value: String },
    #[error("Invalid action index {0} (expected 0, 1 or 2)")]
    InvalidAction(i64),
    #[error("Episode has terminated; call reset() before stepping again")]
    EpisodeTerminated,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using DuetError.
pub type Result<T> = std::result::Result<T, DuetError>;
