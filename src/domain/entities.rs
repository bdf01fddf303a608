//! Domain entities. Pure data structures for the relay pipeline.
//!
//! No HTTP client or database types here. Adapters map to and from these.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;

/// Message returned with every 400. Existing consumers match on it.
pub const EMPTY_INPUT_MESSAGE: &str = "Empty or missing 'inputs' received by Lambda";

/// Max characters of the original event echoed back in a 400 body.
pub const RAW_EVENT_SAMPLE_CHARS: usize = 500;

/// Max characters of the prompt persisted in a log record.
pub const MAX_LOGGED_PROMPT_CHARS: usize = 4000;

/// Fixed decoding configuration sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodingParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub do_sample: bool,
    pub return_full_text: bool,
}

impl Default for DecodingParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 128,
            temperature: 0.0,
            top_p: 0.9,
            do_sample: false,
            return_full_text: false,
        }
    }
}

/// Normalized request forwarded to the inference endpoint.
///
/// `inputs` is forwarded exactly as extracted; validation trims only to check
/// emptiness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub inputs: String,
    pub parameters: DecodingParameters,
}

impl InferenceRequest {
    pub fn new(inputs: impl Into<String>) -> Self {
        Self {
            inputs: inputs.into(),
            parameters: DecodingParameters::default(),
        }
    }
}

/// Per-invocation data supplied by the hosting runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Context with a fresh random request id (UUID v4).
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Composite key `<epoch-millis>#<request-id>`. Primary key of the log store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvocationId(String);

impl InvocationId {
    pub fn new(epoch_millis: i64, request_id: &str) -> Self {
        Self(format!("{}#{}", epoch_millis, request_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one remote invocation. Exactly one side holds.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    Success(Value),
    Failure(String),
}

impl InvocationOutcome {
    /// Decode raw endpoint bytes. Invalid UTF-8 is replaced, non-JSON text is
    /// wrapped as `{"_raw": text}`.
    pub fn from_response_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let value = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "_raw": text }));
        InvocationOutcome::Success(value)
    }

    pub fn status(&self) -> LogStatus {
        match self {
            InvocationOutcome::Success(_) => LogStatus::Ok,
            InvocationOutcome::Failure(_) => LogStatus::Error,
        }
    }

    /// Value persisted in the log record's `response` field.
    pub fn log_payload(&self) -> String {
        match self {
            InvocationOutcome::Success(value) => to_json_or_debug(value),
            InvocationOutcome::Failure(description) => {
                to_json_or_debug(&json!({ "invoke_error": description }))
            }
        }
    }

    /// 200 with `{"result": ...}` or 502 with `{"error": ...}`.
    pub fn into_response(self) -> HttpResponse {
        match self {
            InvocationOutcome::Success(value) => HttpResponse::json(200, &json!({ "result": value })),
            InvocationOutcome::Failure(description) => {
                HttpResponse::json(502, &json!({ "error": description }))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Ok,
    Error,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Ok => "ok",
            LogStatus::Error => "error",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable row in the invocation log. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    pub request_id: String,
    pub status: LogStatus,
    pub prompt: String,
    pub response: String,
    pub timestamp: i64,
}

impl LogRecord {
    pub fn new(
        invocation_id: &InvocationId,
        prompt: &str,
        outcome: &InvocationOutcome,
        timestamp: i64,
    ) -> Self {
        Self {
            id: invocation_id.to_string(),
            request_id: invocation_id.to_string(),
            status: outcome.status(),
            prompt: truncate_chars(prompt, MAX_LOGGED_PROMPT_CHARS).to_string(),
            response: outcome.log_payload(),
            timestamp,
        }
    }
}

/// HTTP-shaped response returned to the hosting runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn json(status_code: u16, body: &Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// 400 for an event without usable `inputs`. Echoes a prefix of the event.
    ///
    /// `raw_event_sample` is the first 500 characters of the event's compact JSON
    /// serialization (`{"inputs":""}`), not a language-specific repr.
    pub fn empty_input(event: &Value) -> Self {
        let serialized = event.to_string();
        let sample = truncate_chars(&serialized, RAW_EVENT_SAMPLE_CHARS);
        Self::json(
            400,
            &json!({
                "error": EMPTY_INPUT_MESSAGE,
                "raw_event_sample": sample,
            }),
        )
    }

    /// Body parsed back into JSON. Mostly useful to callers inspecting results.
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// First `max` characters of `s` (not bytes), borrowed.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn to_json_or_debug<T: Serialize + fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}
