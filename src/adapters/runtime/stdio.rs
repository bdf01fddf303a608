//! Stdio runtime. One invocation per process.
//!
//! Reads the whole event from the input stream, hands it to the InvocationPort and
//! writes the HTTP-shaped response as a single JSON line. Input that is not JSON is
//! passed on as a string event, which the handler rejects with 400.

use crate::domain::{DomainError, HttpResponse, InvocationContext};
use crate::ports::InvocationPort;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

pub struct StdioRuntime {
    handler: Arc<dyn InvocationPort>,
}

impl StdioRuntime {
    pub fn new(handler: Arc<dyn InvocationPort>) -> Self {
        Self { handler }
    }

    /// Serve one event from process stdin to stdout.
    pub async fn run_once(&self, ctx: &InvocationContext) -> Result<HttpResponse, DomainError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout(), ctx).await
    }

    /// Serve one event from `reader` to `writer`. Handler errors are returned
    /// without writing a response.
    pub async fn serve<R, W>(
        &self,
        mut reader: R,
        mut writer: W,
        ctx: &InvocationContext,
    ) -> Result<HttpResponse, DomainError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .await
            .map_err(|e| DomainError::Runtime(format!("read event: {}", e)))?;
        let event = parse_event(&raw);
        debug!(bytes = raw.len(), request_id = %ctx.request_id, "event received");

        let response = self.handler.handle(&event, ctx).await?;

        let mut line = serde_json::to_vec(&response)
            .map_err(|e| DomainError::Runtime(format!("encode response: {}", e)))?;
        line.push(b'\n');
        writer
            .write_all(&line)
            .await
            .map_err(|e| DomainError::Runtime(format!("write response: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| DomainError::Runtime(format!("flush response: {}", e)))?;

        info!(status_code = response.status_code, request_id = %ctx.request_id, "response written");
        Ok(response)
    }
}

fn parse_event(raw: &[u8]) -> Value {
    let text = String::from_utf8_lossy(raw);
    serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.into_owned()))
}
