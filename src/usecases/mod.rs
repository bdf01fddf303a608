//! Application use cases. Orchestrate domain logic via ports.

pub mod request_adapter;

pub use request_adapter::RequestAdapter;
