//! Path-to-method dispatch core.
//!
//! Applications expose routable methods as typed [`MethodDescriptor`]
//! overloads. Registering a method under a path prefix synthesises one
//! end-anchored regular expression per overload, where each parameter kind
//! contributes a capture group. The start is not anchored, so
//! `app/greet/42` reaches the `greet` routes too. Looking up a path returns a [`BoundAction`]:
//! the matching template paired with the raw segments it captured.
//! Executing the bound action converts those segments to typed [`Value`]s
//! and invokes the method on the owning [`Application`].
//!
//! ```text
//!   register("greet", "greet")      lookup("greet/42")        execute()
//!   ──────────────────────────►  ActionRegistry  ──────────►  BoundAction ──► Value
//!    /?greet$                     first match wins             convert + call
//!    /?greet/(-?\d+)$
//!    /?greet/(.*)/(-?\d+)$
//! ```
//!
//! The registry is safe to share between threads. Reads never block on a
//! concurrent registration and a registration publishes all of its
//! overloads at once.
//!
//! Logging goes through `tracing` under [`REGISTRY_TARGET`] and
//! [`DISPATCH_TARGET`]; see [`telemetry`] for a ready-made subscriber driven
//! by [`switchyard_config::Config`].

mod action;
mod application;
mod command_line;
pub mod context;
pub mod convert;
mod error;
mod method;
pub mod pattern;
mod registry;
pub mod telemetry;
mod value;

pub use action::{Action, ActionBuilder, BoundAction, Mode};
pub use application::Application;
pub use command_line::{CommandLine, CommandOption};
pub use context::{Attributes, Context};
pub use error::DispatchError;
pub use method::{
    BoxError, EnumSpec, MemoryCache, MethodCache, MethodDescriptor, ObjectCache, ParamKind,
    ReturnKind,
};
pub use pattern::CompiledPattern;
pub use registry::{ActionRegistry, RouteKey};
pub use switchyard_config::{Config, LogFormat, LookupOrder, OrthoError, RegistryConfig};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use value::Value;

/// Tracing target for registration, lookup and method introspection.
pub const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Tracing target for action execution.
pub const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

#[cfg(test)]
mod tests;
