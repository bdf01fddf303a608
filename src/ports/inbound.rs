//! Inbound port. The hosting runtime calls into the application.

use crate::domain::{DomainError, HttpResponse, InvocationContext};
use serde_json::Value;

/// Handle one inbound event and produce an HTTP-shaped response.
#[async_trait::async_trait]
pub trait InvocationPort: Send + Sync {
    /// Upstream failures are folded into the response (502). `Err` is reserved
    /// for failures the handler does not recover from, such as a failed log write.
    async fn handle(
        &self,
        event: &Value,
        ctx: &InvocationContext,
    ) -> Result<HttpResponse, DomainError>;
}
