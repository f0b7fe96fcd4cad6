use thiserror::Error;

/// Errors surfaced to callers of the analysis fabric.
///
/// Adapter failures never appear here: per-source actors swallow them and
/// return neutral values so downstream composition tolerates partial data.
#[derive(Error, Debug)]
pub enum TubeSignalError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Durable state write failed: {0}")]
    Persist(String),

    #[error("Actor route unavailable: {0}")]
    RouteUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
