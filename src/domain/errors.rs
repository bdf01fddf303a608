//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Upstream invocation failure. The message is returned to the caller
    /// verbatim in the 502 body and in the `invoke_error` log field.
    #[error("{0}")]
    Inference(String),

    #[error("Log store error: {0}")]
    LogStore(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime I/O error: {0}")]
    Runtime(String),
}
