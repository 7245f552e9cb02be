//! Options for configuring a [`Tracer`].

use std::fmt;
use std::sync::Arc;

use crate::handler::Handler;
use crate::key::Key;
use crate::tracer::{IdGenerator, Tracer, TracerFn};

/// One override applied to a [`Tracer`] by [`Tracer::new`] or [`Tracer::apply`].
#[derive(Clone)]
pub enum TracerOption {
    TracerFn(TracerFn),
    Key(Key),
    IdGenerator(IdGenerator),
}

impl TracerOption {
    pub(crate) fn apply_to(self, tracer: &mut Tracer) {
        match self {
            Self::TracerFn(func) => tracer.func = func,
            Self::Key(key) => tracer.key = key,
            Self::IdGenerator(id_generator) => tracer.id_generator = id_generator,
        }
    }
}

impl fmt::Debug for TracerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TracerFn(func) => f.debug_tuple("TracerFn").field(func).finish(),
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::IdGenerator(_) => f.write_str("IdGenerator"),
        }
    }
}

/// Use a custom function instead of the built-in injection.
pub fn with_tracer_fn<F>(func: F) -> TracerOption
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    TracerOption::TracerFn(TracerFn::Custom(Arc::new(func)))
}

/// Store request ids under a custom key.
pub fn with_tracer_key(key: impl Into<Key>) -> TracerOption {
    TracerOption::Key(key.into())
}

/// Use a custom id generator.
pub fn with_id_generator<F>(generator: F) -> TracerOption
where
    F: Fn() -> String + Send + Sync + 'static,
{
    TracerOption::IdGenerator(Arc::new(generator))
}
