//! Common error types for listlift

use thiserror::Error;

/// Common result type for listlift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared across the workspace.
///
/// Every variant here is fatal to the run. A catalog search that merely
/// returns no candidates is not an error; those come back as `Ok(None)`
/// from the service layer and are handled (counted and skipped) at the
/// call site.
#[derive(Error, Debug)]
pub enum Error {
    /// Source page unreachable or non-2xx HTTP status
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Expected title/list markup absent from the fetched page
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential or token failure against the streaming service
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Streaming service returned a non-success response mid-run
    #[error("Service error: {0}")]
    Service(String),

    /// Requested list category has no resolution strategy
    #[error("Unsupported category: {0}")]
    Unsupported(String),

    /// Invalid user input (category selector, pasted redirect URL)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
