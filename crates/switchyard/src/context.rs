//! Per-call attribute bag consulted during execution.
//!
//! Hosting layers attach the current request, response and a help marker to
//! a [`Context`]. The dispatch core reads exactly three well-known keys and
//! never interprets any other attribute.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Attribute key holding the current request object.
pub const REQUEST_KEY: &str = "HTTP_REQUEST";

/// Attribute key holding the current response object.
pub const RESPONSE_KEY: &str = "HTTP_RESPONSE";

/// Attribute key whose presence asks for help output instead of dispatch.
pub const HELP_KEY: &str = "--help";

/// Shared, type-erased attribute value.
pub type Attribute = Arc<dyn Any + Send + Sync>;

/// Read-only view of the side channel available to an executing action.
pub trait Context: Send + Sync {
    /// Returns the attribute stored under `key`.
    fn attribute(&self, key: &str) -> Option<Attribute>;

    /// Returns `true` when the caller asked for help output.
    fn help_requested(&self) -> bool {
        self.attribute(HELP_KEY).is_some()
    }
}

/// In-memory [`Context`] implementation.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use switchyard::context::{Attributes, Context, HELP_KEY};
///
/// let context = Attributes::new().with(HELP_KEY, Arc::new(true));
/// assert!(context.help_requested());
/// ```
#[derive(Clone, Default)]
pub struct Attributes {
    values: HashMap<String, Attribute>,
}

impl Attributes {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bag with `value` stored under `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Attribute) -> Self {
        self.set(key, value);
        self
    }

    /// Stores `value` under `key`, returning the previous attribute.
    pub fn set(&mut self, key: impl Into<String>, value: Attribute) -> Option<Attribute> {
        self.values.insert(key.into(), value)
    }

    /// Removes the attribute stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        self.values.remove(key)
    }

    /// Returns the number of stored attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no attributes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Context for Attributes {
    fn attribute(&self, key: &str) -> Option<Attribute> {
        self.values.get(key).cloned()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Attributes").field("keys", &keys).finish()
    }
}
