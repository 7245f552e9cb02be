//! The request id tracer.

use std::fmt;
use std::sync::Arc;

use axum::extract::Request;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::handler::Handler;
use crate::key::{Key, DEFAULT_TRACING_KEY};
use crate::layer::RequestIdLayer;
use crate::options::TracerOption;

/// Produces a fresh request id.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Replaces the whole injection step: takes the next handler, returns the
/// handler to mount in its place.
pub type WrapFn = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// The wrapping behavior a [`Tracer`] applies in [`Tracer::trace`].
#[derive(Clone)]
pub enum TracerFn {
    /// Bind a generated id under the tracer's key unless a string is
    /// already bound there.
    AddRequestId,
    /// Caller-supplied behavior. The tracer's key and generator are not
    /// consulted.
    Custom(WrapFn),
}

impl fmt::Debug for TracerFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddRequestId => f.write_str("AddRequestId"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Adds a request id to the context of every request passing through the
/// handlers it wraps.
///
/// Built once at startup with [`Tracer::new`] and shared read-only
/// afterwards; cloning is cheap.
#[derive(Clone)]
pub struct Tracer {
    pub(crate) func: TracerFn,
    pub(crate) key: Key,
    pub(crate) id_generator: IdGenerator,
}

impl Tracer {
    /// Creates a tracer with the default key, UUID v4 ids and the built-in
    /// injection behavior, then applies `options` in order.
    pub fn new<I>(options: I) -> Self
    where
        I: IntoIterator<Item = TracerOption>,
    {
        let mut tracer = Self {
            func: TracerFn::AddRequestId,
            key: DEFAULT_TRACING_KEY,
            id_generator: Arc::new(generate_id),
        };

        tracer.apply(options);

        tracer
    }

    /// Applies further options. Later options win over earlier ones touching
    /// the same setting.
    pub fn apply<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = TracerOption>,
    {
        for option in options {
            option.apply_to(self);
        }
    }

    /// The key request ids are stored under.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The installed wrapping behavior.
    pub fn tracer_fn(&self) -> &TracerFn {
        &self.func
    }

    /// Wraps `next` with the installed behavior.
    pub fn trace(&self, next: Handler) -> Handler {
        match &self.func {
            TracerFn::AddRequestId => self.add_request_id(next),
            TracerFn::Custom(wrap) => wrap(next),
        }
    }

    /// A [`tower::Layer`] tracing every service it wraps.
    pub fn layer(&self) -> RequestIdLayer {
        RequestIdLayer::new(self.clone())
    }

    fn add_request_id(&self, next: Handler) -> Handler {
        let key = self.key.clone();
        let id_generator = Arc::clone(&self.id_generator);

        Handler::new(move |mut request: Request| {
            let ctx = RequestContext::from_request(&request);

            let ctx = if ctx.request_id(&key).is_some() {
                tracing::trace!(key = %key, "request id already present");
                ctx
            } else {
                if ctx.contains(&key) {
                    tracing::debug!(key = %key, "non-string value under request id key, replacing");
                }
                let id = id_generator();
                tracing::debug!(key = %key, "generated request id");
                ctx.with_value(key.clone(), id)
            };

            ctx.attach(&mut request);

            next.handle(request)
        })
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new([])
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("func", &self.func)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Generate a new request id (hyphenated UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
