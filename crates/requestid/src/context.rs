//! Immutable per-request key/value carrier.
//!
//! A [`RequestContext`] travels with the request in its [`http::Extensions`].
//! Middleware derives new contexts from it with [`RequestContext::with_value`]
//! and re-attaches them; downstream handlers read it back with
//! [`RequestContext::from_request`] or the axum extractor.

use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::Request;

use crate::key::Key;

type Value = Arc<dyn Any + Send + Sync>;

struct Binding {
    key: Key,
    value: Value,
    parent: Option<Arc<Binding>>,
}

/// Per-request key/value carrier.
///
/// Contexts are never mutated. [`with_value`](Self::with_value) returns a new
/// context sharing every existing binding with the original, so cloning and
/// deriving are both cheap. Lookups start at the most recent binding: a later
/// binding for a key shadows earlier ones.
#[derive(Clone, Default)]
pub struct RequestContext {
    head: Option<Arc<Binding>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context with one additional binding.
    pub fn with_value<T>(&self, key: Key, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Binding {
                key,
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Type-checked lookup.
    ///
    /// `None` when `key` is unbound or when its most recent binding holds a
    /// value of another type.
    pub fn value<T: Any>(&self, key: &Key) -> Option<&T> {
        self.lookup(key).and_then(|value| (**value).downcast_ref::<T>())
    }

    /// The string bound under `key`, if any.
    pub fn request_id(&self, key: &Key) -> Option<&str> {
        self.value::<String>(key).map(String::as_str)
    }

    /// Whether `key` is bound at all, whatever the type of its value.
    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.lookup(key).is_some()
    }

    /// The context attached to `request`, or an empty one.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        request
            .extensions()
            .get::<Self>()
            .cloned()
            .unwrap_or_default()
    }

    /// Attaches this context to `request`, replacing any previous one.
    pub fn attach<B>(self, request: &mut Request<B>) {
        request.extensions_mut().insert(self);
    }

    fn lookup(&self, key: &Key) -> Option<&Value> {
        let mut node = self.head.as_deref();
        while let Some(binding) = node {
            if binding.key == *key {
                return Some(&binding.value);
            }
            node = binding.parent.as_deref();
        }
        None
    }

    fn keys(&self) -> impl Iterator<Item = &Key> {
        std::iter::successors(self.head.as_deref(), |binding| binding.parent.as_deref())
            .map(|binding| &binding.key)
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}
