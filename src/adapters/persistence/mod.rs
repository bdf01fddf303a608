//! Persistence adapters. Implements LogStorePort.

pub mod sqlite_log;

pub use sqlite_log::SqliteLogStore;
