//! Request adapter. One event in, one HTTP-shaped response out.
//!
//! Coordinates envelope decoding (domain), the inference endpoint and the log store (ports).

use crate::domain::{
    DomainError, HttpResponse, InferenceRequest, InvocationContext, InvocationId,
    InvocationOutcome, LogRecord, decode_params, usable_inputs,
};
use crate::ports::{InferencePort, InvocationPort, LogStorePort};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Linear pipeline with two exits:
/// 1. Decode the event and validate `inputs` (early 400, nothing logged)
/// 2. Invoke the endpoint with fixed decoding parameters
/// 3. Append exactly one log record (ok or error)
/// 4. Return 200 with the result or 502 with the error description
pub struct RequestAdapter {
    inference: Arc<dyn InferencePort>,
    log_store: Arc<dyn LogStorePort>,
}

impl RequestAdapter {
    pub fn new(inference: Arc<dyn InferencePort>, log_store: Arc<dyn LogStorePort>) -> Self {
        Self {
            inference,
            log_store,
        }
    }

    pub async fn handle(
        &self,
        event: &Value,
        ctx: &InvocationContext,
    ) -> Result<HttpResponse, DomainError> {
        let params = decode_params(event);
        let Some(text) = usable_inputs(&params) else {
            warn!(request_id = %ctx.request_id, "rejecting event without usable inputs");
            return Ok(HttpResponse::empty_input(event));
        };

        let request = InferenceRequest::new(text);
        let invocation_id = InvocationId::new(Utc::now().timestamp_millis(), &ctx.request_id);
        info!(
            invocation_id = %invocation_id,
            prompt_len = text.chars().count(),
            "invoking inference endpoint"
        );

        let outcome = match self.inference.invoke(&request).await {
            Ok(bytes) => InvocationOutcome::from_response_bytes(&bytes),
            Err(e) => {
                warn!(invocation_id = %invocation_id, error = %e, "inference invocation failed");
                InvocationOutcome::Failure(e.to_string())
            }
        };

        let record = LogRecord::new(&invocation_id, text, &outcome, Utc::now().timestamp());
        // Not recovered: a lost log write fails the whole invocation.
        self.log_store.append(&record).await?;

        info!(
            invocation_id = %invocation_id,
            status = %record.status,
            "invocation logged"
        );

        Ok(outcome.into_response())
    }
}

#[async_trait::async_trait]
impl InvocationPort for RequestAdapter {
    async fn handle(
        &self,
        event: &Value,
        ctx: &InvocationContext,
    ) -> Result<HttpResponse, DomainError> {
        RequestAdapter::handle(self, event, ctx).await
    }
}
