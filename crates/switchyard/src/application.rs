//! The capability surface an application exposes to the dispatch core.

use std::any::Any;
use std::sync::Arc;

use crate::command_line::CommandLine;
use crate::context::Context;
use crate::method::MethodDescriptor;
use crate::value::Value;

/// An object whose methods can be routed to.
///
/// Only [`Application::name`] and [`Application::overloads`] are required.
/// The remaining hooks default to "not supported" so simple applications
/// stay small.
pub trait Application: Any + Send + Sync {
    /// Display name used in logs and error messages.
    fn name(&self) -> &str;

    /// Qualified type name used to key the method cache.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Declares every overload published under `method`.
    ///
    /// An empty list means the application has no such method.
    fn overloads(&self, method: &str) -> Vec<MethodDescriptor>;

    /// Returns the context of the call currently in flight, if any.
    fn current_context(&self) -> Option<Arc<dyn Context>> {
        None
    }

    /// Returns an instance scoped to `context` that should receive the call
    /// instead of `self`.
    fn context_bound_instance(&self, _context: &dyn Context) -> Option<Arc<dyn Application>> {
        None
    }

    /// Cleanup hook run after a void method completes.
    fn destroy(&self) {}

    /// Whether void methods should still produce [`Application::render`] output.
    fn requires_rendered_output(&self) -> bool {
        false
    }

    /// Renders the application state as text.
    fn render(&self) -> String {
        String::new()
    }

    /// Help output returned when the context asks for it.
    fn help(&self) -> Value {
        Value::Text(format!("No help is available for {}.", self.name()))
    }

    /// CLI metadata for `path`, stored by the registry at registration.
    fn cli_metadata(&self, _path: &str) -> Option<CommandLine> {
        None
    }
}
