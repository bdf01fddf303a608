//! Inbound event decoding.
//!
//! Recognized shapes:
//! - direct invoke: `{"inputs": "..."}`
//! - gateway proxy: `{"body": "{\"inputs\": \"...\"}"}`
//! - gateway proxy, base64: `{"isBase64Encoded": true, "body": "eyJpbnB1dHMiOi..."}`
//! - gateway proxy, mapping body: `{"body": {"inputs": "..."}}`
//!
//! Anything else decodes to empty parameters and fails validation downstream.
//! Decoding never errors.

use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};
use tracing::debug;

pub type Params = Map<String, Value>;

/// Standard alphabet, padding required, non-zero trailing bits accepted.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Top-level shape of an inbound event.
#[derive(Debug, PartialEq)]
pub enum Envelope<'a> {
    Direct(&'a Params),
    Proxied(ProxyBody<'a>),
    Unrecognized,
}

/// Payload carried in a proxied event's `body` field.
#[derive(Debug, PartialEq)]
pub enum ProxyBody<'a> {
    Text(&'a str),
    Base64Text(&'a str),
    Mapping(&'a Params),
    Other,
}

impl<'a> Envelope<'a> {
    pub fn classify(event: &'a Value) -> Self {
        let Some(map) = event.as_object() else {
            return Envelope::Unrecognized;
        };
        let Some(body) = map.get("body") else {
            return Envelope::Direct(map);
        };
        let base64 = map.get("isBase64Encoded") == Some(&Value::Bool(true));
        let body = match body {
            Value::String(s) if base64 => ProxyBody::Base64Text(s),
            Value::String(s) => ProxyBody::Text(s),
            Value::Object(m) => ProxyBody::Mapping(m),
            _ => ProxyBody::Other,
        };
        Envelope::Proxied(body)
    }

    /// Collapse into one parameter mapping.
    pub fn into_params(self) -> Params {
        match self {
            Envelope::Direct(map) => map.clone(),
            Envelope::Proxied(ProxyBody::Mapping(map)) => map.clone(),
            Envelope::Proxied(ProxyBody::Text(text)) => parse_params(text),
            Envelope::Proxied(ProxyBody::Base64Text(encoded)) => {
                match decode_base64_lenient(encoded) {
                    Ok(bytes) => parse_params(&String::from_utf8_lossy(&bytes)),
                    Err(e) => {
                        debug!(error = %e, "proxy body is not valid base64");
                        Params::new()
                    }
                }
            }
            Envelope::Proxied(ProxyBody::Other) | Envelope::Unrecognized => Params::new(),
        }
    }
}

/// Normalize any event into its parameter mapping.
pub fn decode_params(event: &Value) -> Params {
    Envelope::classify(event).into_params()
}

/// The `inputs` text if it is a string with non-whitespace content.
/// Returned untrimmed.
pub fn usable_inputs(params: &Params) -> Option<&str> {
    params
        .get("inputs")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Characters outside the base64 alphabet (line wraps, stray whitespace) are
/// skipped before decoding, so MIME-wrapped bodies decode too.
fn decode_base64_lenient(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = encoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    LENIENT_BASE64.decode(cleaned)
}

fn parse_params(text: &str) -> Params {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            debug!("proxy body is JSON but not an object");
            Params::new()
        }
        Err(e) => {
            debug!(error = %e, "proxy body is not valid JSON");
            Params::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs_of(event: Value) -> Option<String> {
        usable_inputs(&decode_params(&event)).map(str::to_string)
    }

    #[test]
    fn test_direct_invoke() {
        assert_eq!(inputs_of(json!({ "inputs": "hey" })).as_deref(), Some("hey"));
    }

    #[test]
    fn test_proxy_string_body() {
        let event = json!({ "body": "{\"inputs\": \"hello\"}" });
        assert_eq!(inputs_of(event).as_deref(), Some("hello"));
    }

    #[test]
    fn test_proxy_base64_body() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(r#"{"inputs": "hi"}"#);
        let event = json!({ "body": encoded, "isBase64Encoded": true });
        assert_eq!(inputs_of(event).as_deref(), Some("hi"));
    }

    #[test]
    fn test_proxy_base64_body_wrapped_at_76_columns() {
        let prompt = "x".repeat(80);
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(json!({ "inputs": &prompt }).to_string());
        let wrapped = encoded
            .as_bytes()
            .chunks(76)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\n")
            + "\n";
        assert!(wrapped.lines().count() > 1);

        let event = json!({ "body": wrapped, "isBase64Encoded": true });
        assert_eq!(inputs_of(event), Some(prompt));
    }

    #[test]
    fn test_proxy_base64_body_with_nonzero_trailing_bits() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(r#"{"inputs": "hi"}"#);
        assert!(encoded.ends_with("fQ=="));
        // Same final byte, but the unused low bits of the last symbol are set.
        let sloppy = format!("{}fR==", &encoded[..encoded.len() - 4]);

        let event = json!({ "body": sloppy, "isBase64Encoded": true });
        assert_eq!(inputs_of(event).as_deref(), Some("hi"));
    }

    #[test]
    fn test_base64_flag_must_be_boolean_true() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(r#"{"inputs": "hi"}"#);
        let event = json!({ "body": encoded, "isBase64Encoded": "true" });
        // Treated as a plain JSON string, which base64 text is not.
        assert_eq!(inputs_of(event), None);
    }

    #[test]
    fn test_invalid_base64_yields_empty_params() {
        let event = json!({ "body": "!!!not base64!!!", "isBase64Encoded": true });
        assert!(decode_params(&event).is_empty());
    }

    #[test]
    fn test_base64_with_invalid_utf8_is_replaced_not_fatal() {
        let mut raw = br#"{"inputs": "caf"#.to_vec();
        raw.push(0xff);
        raw.extend_from_slice(br#""}"#);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&raw);
        let event = json!({ "body": encoded, "isBase64Encoded": true });
        assert_eq!(inputs_of(event).as_deref(), Some("caf\u{FFFD}"));
    }

    #[test]
    fn test_proxy_mapping_body() {
        let event = json!({ "body": { "inputs": "nested" } });
        assert_eq!(inputs_of(event).as_deref(), Some("nested"));
    }

    #[test]
    fn test_malformed_json_body_yields_empty_params() {
        let event = json!({ "body": "not json" });
        assert!(decode_params(&event).is_empty());
    }

    #[test]
    fn test_non_object_json_body_yields_empty_params() {
        let event = json!({ "body": "[1, 2, 3]" });
        assert!(decode_params(&event).is_empty());
    }

    #[test]
    fn test_other_body_types_yield_empty_params() {
        for body in [json!(null), json!(5), json!(["inputs"])] {
            let event = json!({ "body": body, "inputs": "ignored" });
            assert_eq!(Envelope::classify(&event), Envelope::Proxied(ProxyBody::Other));
            assert!(decode_params(&event).is_empty());
        }
    }

    #[test]
    fn test_non_mapping_event_is_unrecognized() {
        for event in [json!("inputs"), json!(42), json!(null), json!([{ "inputs": "x" }])] {
            assert_eq!(Envelope::classify(&event), Envelope::Unrecognized);
            assert!(decode_params(&event).is_empty());
        }
    }

    #[test]
    fn test_usable_inputs_rejects_blank_and_non_string() {
        assert_eq!(inputs_of(json!({})), None);
        assert_eq!(inputs_of(json!({ "inputs": "" })), None);
        assert_eq!(inputs_of(json!({ "inputs": " \n\t " })), None);
        assert_eq!(inputs_of(json!({ "inputs": 12 })), None);
        assert_eq!(inputs_of(json!({ "inputs": ["a"] })), None);
    }

    #[test]
    fn test_usable_inputs_is_not_trimmed() {
        assert_eq!(
            inputs_of(json!({ "inputs": "  padded  " })).as_deref(),
            Some("  padded  ")
        );
    }
}
