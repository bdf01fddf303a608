//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the hosting runtime into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::InvocationPort;
pub use outbound::{InferencePort, LogStorePort};
