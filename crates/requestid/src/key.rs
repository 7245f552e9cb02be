//! Context keys.

use std::borrow::Cow;
use std::fmt;

/// Names a slot in a [`RequestContext`](crate::RequestContext).
///
/// Keys compare by content, so a key built from a `&'static str` equals one
/// built from an owned `String` with the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Cow<'static, str>);

/// The key the default tracer reads and writes request ids under.
pub const DEFAULT_TRACING_KEY: Key = Key::from_static("request-id");

impl Key {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}
