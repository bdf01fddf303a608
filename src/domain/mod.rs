//! Core domain layer. No external I/O dependencies.
//!
//! Event decoding, request/response shapes and log records live here.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::{
    DecodingParameters, HttpResponse, InferenceRequest, InvocationContext, InvocationId,
    InvocationOutcome, LogRecord, LogStatus,
};
pub use envelope::{Envelope, Params, ProxyBody, decode_params, usable_inputs};
pub use errors::DomainError;
