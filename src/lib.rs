//! inference-relay: forward inference events to a hosted model endpoint and log every outcome.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
