//! Reusable log subscriber setup and span helpers for request id services.

pub mod config;
pub mod spans;
pub mod subscriber;

pub use config::{LogFormat, TracingConfig};
pub use subscriber::{init_tracing, try_init_tracing};
