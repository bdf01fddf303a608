//! Inference adapter module. Implements InferencePort over HTTP.

pub mod http_endpoint;

pub use http_endpoint::HttpEndpointAdapter;
