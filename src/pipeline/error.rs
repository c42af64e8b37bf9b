//! Pipeline-specific error types.

use thiserror::Error;

/// Errors that can occur while building or tearing down the pipeline.
///
/// None of these arise on the data path: parse failures are notifications,
/// an empty buffer is `None`, and cancellation is a normal shutdown.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Sliding window capacity must be at least 1")]
    InvalidCapacity,

    #[error("Drain interval must be greater than zero")]
    InvalidInterval,

    #[error("Failed to spawn stage thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Stage '{0}' panicked")]
    StagePanicked(String),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
