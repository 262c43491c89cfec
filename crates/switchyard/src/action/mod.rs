//! Dispatch units: immutable route templates and their bound clones.
//!
//! An [`Action`] is created once per method overload when routes are
//! registered. A successful lookup produces a [`BoundAction`] that shares the
//! template and owns the raw argument strings captured from the path.
//! [`BoundAction::execute`] consumes the bound action, so each one is
//! invoked at most once.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::DISPATCH_TARGET;
use crate::application::Application;
use crate::context::Context;
use crate::convert::convert_arguments;
use crate::error::DispatchError;
use crate::method::{MethodDescriptor, ReturnKind};
use crate::pattern::CompiledPattern;
use crate::value::Value;

/// Dispatch channel an action is meant for.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Mode {
    /// Command-line invocations only.
    Cli,
    /// HTTP requests only.
    Web,
    /// Any channel.
    #[default]
    All,
}

impl Mode {
    /// Returns `true` when an action in this mode may serve `channel`.
    pub fn accepts(self, channel: Self) -> bool {
        self == Self::All || channel == Self::All || self == channel
    }
}

/// Immutable route template.
pub struct Action {
    id: u64,
    pattern: Option<Arc<CompiledPattern>>,
    owner: Arc<dyn Application>,
    method: Option<MethodDescriptor>,
    mode: Mode,
    priority: i32,
}

impl Action {
    /// Starts building a template owned by `owner`.
    pub fn builder(owner: Arc<dyn Application>) -> ActionBuilder {
        ActionBuilder {
            pattern: None,
            owner,
            method: None,
            mode: Mode::default(),
            priority: 0,
        }
    }

    /// Registration sequence number. Zero until stored in a registry.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Compiled route pattern.
    pub fn pattern(&self) -> Option<&CompiledPattern> {
        self.pattern.as_deref()
    }

    /// Pattern text, or an empty string when no pattern is set.
    pub fn pattern_text(&self) -> &str {
        self.pattern().map_or("", CompiledPattern::as_str)
    }

    /// Application that receives the call.
    pub fn owner(&self) -> &Arc<dyn Application> {
        &self.owner
    }

    /// Method invoked on dispatch.
    pub const fn method(&self) -> Option<&MethodDescriptor> {
        self.method.as_ref()
    }

    /// Channel restriction.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Declared priority.
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Clones the template with `arguments` bound.
    pub fn bind(self: &Arc<Self>, arguments: Vec<Option<String>>) -> BoundAction {
        BoundAction {
            template: Arc::clone(self),
            arguments,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("pattern", &self.pattern_text())
            .field("owner", &self.owner.name())
            .field("method", &self.method.as_ref().map(MethodDescriptor::name))
            .field("mode", &self.mode)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Builder for [`Action`] templates registered by hand.
pub struct ActionBuilder {
    pattern: Option<Arc<CompiledPattern>>,
    owner: Arc<dyn Application>,
    method: Option<MethodDescriptor>,
    mode: Mode,
    priority: i32,
}

impl ActionBuilder {
    /// Sets the route pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: CompiledPattern) -> Self {
        self.pattern = Some(Arc::new(pattern));
        self
    }

    /// Sets the invoked method.
    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the channel restriction.
    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Finishes the template.
    pub fn build(self) -> Action {
        Action {
            id: 0,
            pattern: self.pattern,
            owner: self.owner,
            method: self.method,
            mode: self.mode,
            priority: self.priority,
        }
    }
}

/// A template bound to the arguments captured from one path.
#[derive(Debug)]
pub struct BoundAction {
    template: Arc<Action>,
    arguments: Vec<Option<String>>,
}

impl BoundAction {
    /// Template this action was bound from.
    pub fn template(&self) -> &Action {
        &self.template
    }

    /// Raw captured arguments in positional order.
    pub fn arguments(&self) -> &[Option<String>] {
        &self.arguments
    }

    /// Mutable access to the captured arguments.
    pub const fn arguments_mut(&mut self) -> &mut Vec<Option<String>> {
        &mut self.arguments
    }

    /// Executes the action with its bound arguments.
    ///
    /// When the owner's current context asks for help, the owner's help
    /// output is returned and the method is not invoked.
    ///
    /// # Errors
    ///
    /// See [`BoundAction::execute_with`].
    pub fn execute(self) -> Result<Value, DispatchError> {
        let Self {
            template,
            arguments,
        } = self;
        let context = template.owner.current_context();
        if context.as_deref().is_some_and(|ctx| ctx.help_requested()) {
            debug!(
                target: DISPATCH_TARGET,
                owner = template.owner.name(),
                "help requested; skipping dispatch"
            );
            return Ok(template.owner.help());
        }
        dispatch(&template, &arguments, context.as_deref())
    }

    /// Executes the action with explicit raw arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnsupportedDispatch`] when the template has no
    /// method, [`DispatchError::ConversionFailed`] when an argument cannot be
    /// converted, and [`DispatchError::Invocation`] when the method fails.
    pub fn execute_with(self, arguments: &[Option<String>]) -> Result<Value, DispatchError> {
        let context = self.template.owner.current_context();
        dispatch(&self.template, arguments, context.as_deref())
    }
}

fn dispatch(
    template: &Action,
    arguments: &[Option<String>],
    context: Option<&dyn Context>,
) -> Result<Value, DispatchError> {
    let method = template
        .method()
        .ok_or_else(|| DispatchError::unsupported_dispatch(template.pattern_text()))?;

    let receiver = context
        .and_then(|ctx| template.owner.context_bound_instance(ctx))
        .unwrap_or_else(|| Arc::clone(&template.owner));

    let values = convert_arguments(method.params(), arguments, context)?;

    debug!(
        target: DISPATCH_TARGET,
        owner = receiver.name(),
        method = method.name(),
        arity = method.arity(),
        "invoking action"
    );

    let result = invoke(method, receiver.as_ref(), &values)?;
    match method.returns() {
        ReturnKind::Value => Ok(result),
        ReturnKind::Void => {
            receiver.destroy();
            if receiver.requires_rendered_output() {
                Ok(Value::Text(receiver.render()))
            } else {
                Ok(Value::Absent)
            }
        }
    }
}

fn invoke(
    method: &MethodDescriptor,
    receiver: &dyn Application,
    values: &[Value],
) -> Result<Value, DispatchError> {
    match panic::catch_unwind(AssertUnwindSafe(|| method.call(receiver, values))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(DispatchError::invocation(
            method.name(),
            innermost_message(&*error),
        )),
        Err(payload) => Err(DispatchError::invocation(
            method.name(),
            panic_message(&*payload),
        )),
    }
}

fn innermost_message(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("method panicked")
    }
}
