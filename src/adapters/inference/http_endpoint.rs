//! HTTP inference adapter.
//!
//! Calls a hosted model endpoint using the invocations convention:
//! `POST {runtime_url}/endpoints/{endpoint_name}/invocations`.
//! Request signing is left to whatever fronts the endpoint; an optional
//! bearer token is supported for gateways that accept one.

use crate::domain::{DomainError, InferenceRequest};
use crate::ports::InferencePort;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

const JSON_MIME: &str = "application/json";

/// Max characters of an error body quoted in the failure description.
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

pub struct HttpEndpointAdapter {
    client: reqwest::Client,
    runtime_url: String,
    endpoint_name: String,
    api_key: Option<String>,
}

impl HttpEndpointAdapter {
    /// Create a new adapter.
    ///
    /// # Arguments
    /// * `runtime_url` - Base URL of the inference runtime
    /// * `endpoint_name` - Name of the deployed endpoint
    /// * `timeout` - Client-side timeout for the whole call; `None` waits as long as the transport does
    pub fn new(
        runtime_url: impl Into<String>,
        endpoint_name: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, DomainError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client build failed: {}", e)))?;
        Ok(Self {
            client,
            runtime_url: runtime_url.into(),
            endpoint_name: endpoint_name.into(),
            api_key: None,
        })
    }

    /// Send `Authorization: Bearer <key>` with every call.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn invocations_url(&self) -> String {
        format!(
            "{}/endpoints/{}/invocations",
            self.runtime_url.trim_end_matches('/'),
            self.endpoint_name
        )
    }
}

#[async_trait::async_trait]
impl InferencePort for HttpEndpointAdapter {
    async fn invoke(&self, request: &InferenceRequest) -> Result<Vec<u8>, DomainError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| DomainError::Inference(format!("Failed to encode request: {}", e)))?;

        let mut call = self
            .client
            .post(self.invocations_url())
            .header(CONTENT_TYPE, JSON_MIME)
            .header(ACCEPT, JSON_MIME)
            .body(body);
        if let Some(key) = &self.api_key {
            call = call.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = call
            .send()
            .await
            .map_err(|e| DomainError::Inference(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, endpoint = %self.endpoint_name, "inference endpoint returned error");
            return Err(DomainError::Inference(format!(
                "endpoint returned {}: {}",
                status,
                text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect::<String>()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::Inference(format!("Failed to read response body: {}", e)))?;

        debug!(len = bytes.len(), endpoint = %self.endpoint_name, "received inference response");

        Ok(bytes.to_vec())
    }
}
