//! Error handling for stagepipe
//!
//! This module defines the crate-wide error type and a Result alias.
//! Pipeline-internal failures live in [`crate::pipeline::PipelineError`]
//! and convert into [`StagePipeError`] with `?`.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for stagepipe operations
#[derive(Error, Debug)]
pub enum StagePipeError {
    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised while building or joining the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<StagePipeError>,
    },
}

impl StagePipeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        StagePipeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for stagepipe operations
pub type Result<T> = std::result::Result<T, StagePipeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<StagePipeError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StagePipeError::Config("buffer_capacity must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: buffer_capacity must be at least 1"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = StagePipeError::Config("bad".to_string());
        let with_ctx = err.with_context("Failed to load config");
        assert!(with_ctx.to_string().contains("Failed to load config"));
        assert!(with_ctx.to_string().contains("bad"));
    }

    #[test]
    fn test_pipeline_error_converts() {
        let result: std::result::Result<(), PipelineError> = Err(PipelineError::InvalidCapacity);
        let err = result.context("Building pipeline").unwrap_err();
        assert!(err.to_string().starts_with("Building pipeline"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: StagePipeError = io.into();
        assert!(matches!(err, StagePipeError::Io(_)));
    }
}
