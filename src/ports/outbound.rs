//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, InferenceRequest, LogRecord};

/// Remote inference endpoint.
#[async_trait::async_trait]
pub trait InferencePort: Send + Sync {
    /// Send the request as JSON and return the raw response bytes.
    /// Any transport, status or read failure is `DomainError::Inference`.
    async fn invoke(&self, request: &InferenceRequest) -> Result<Vec<u8>, DomainError>;
}

/// Durable, append-only invocation log.
#[async_trait::async_trait]
pub trait LogStorePort: Send + Sync {
    /// Insert one record. Must reject a record whose `id` already exists.
    async fn append(&self, record: &LogRecord) -> Result<(), DomainError>;
}
