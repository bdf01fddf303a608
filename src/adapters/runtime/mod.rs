//! Hosting runtimes. Drive the InvocationPort.

pub mod stdio;

pub use stdio::StdioRuntime;
