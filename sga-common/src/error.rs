//! Common error types for SGA

use thiserror::Error;

/// Common result type for SGA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the SGA client
///
/// Every variant is scoped to a single job; none of them are fatal to the
/// process, and a new submission is always possible afterwards.
#[derive(Error, Debug)]
pub enum Error {
    /// Submission rejected, no file selected, or malformed response
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Transport-level failure on the progress stream before completion
    #[error("Progress stream error: {0}")]
    Stream(String),

    /// Result request after completion failed or could not be parsed
    #[error("Result fetch error: {0}")]
    ResultFetch(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
