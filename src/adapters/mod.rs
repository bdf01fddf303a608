//! Infrastructure adapters. Implement ports.
//!
//! Inference endpoint over HTTP, SQLite log store, stdio runtime. Map errors to DomainError.

pub mod inference;
pub mod persistence;
pub mod runtime;
