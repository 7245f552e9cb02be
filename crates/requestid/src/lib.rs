//! Request id injection for axum and tower handler chains.
//!
//! A [`Tracer`] wraps a [`Handler`] so that every request reaching it carries
//! a request id in its [`RequestContext`]. Ids already present are kept;
//! missing ones are generated.

pub mod config;
pub mod context;
pub mod handler;
pub mod key;
pub mod layer;
pub mod options;
pub mod tracer;

pub use config::{ConfigError, IdFormat, TracerConfig};
pub use context::RequestContext;
pub use handler::Handler;
pub use key::{Key, DEFAULT_TRACING_KEY};
pub use layer::RequestIdLayer;
pub use options::{with_id_generator, with_tracer_fn, with_tracer_key, TracerOption};
pub use tracer::{generate_id, IdGenerator, Tracer, TracerFn, WrapFn};
