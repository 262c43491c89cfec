//! Failures surfaced by registration, binding and invocation.
//!
//! Registration-time variants ([`DispatchError::InvalidArgument`],
//! [`DispatchError::InvalidPattern`], [`DispatchError::RouteConflict`]) point
//! at configuration mistakes and are never retried. Execute-time variants
//! are one-shot: the target method may already have run partially, so the
//! hosting layer decides how to report them.

use thiserror::Error;

use crate::method::ParamKind;

/// Errors surfaced by the dispatch core.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required registration input was absent or blank.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the missing input.
        message: String,
    },

    /// Synthesised pattern text did not compile.
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern text that failed to compile.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: Box<regex::Error>,
    },

    /// Another registration already owns the same route.
    #[error("route '{route}' is already registered by '{existing}'")]
    RouteConflict {
        /// Display form of the contested route.
        route: String,
        /// Method that currently owns the route.
        existing: String,
    },

    /// The bound action carries no method reference.
    #[error("action for pattern '{pattern}' has no method to dispatch")]
    UnsupportedDispatch {
        /// Pattern text of the offending action.
        pattern: String,
    },

    /// A captured argument could not be converted to its declared kind.
    #[error("cannot convert '{value}' to {kind}: {message}")]
    ConversionFailed {
        /// Declared parameter kind.
        kind: ParamKind,
        /// Raw captured value.
        value: String,
        /// Parser failure description.
        message: String,
    },

    /// The target method failed.
    #[error("method '{method}' failed: {message}")]
    Invocation {
        /// Name of the invoked method.
        method: String,
        /// Innermost cause reported by the method.
        message: String,
    },
}

impl DispatchError {
    /// Returns the process exit status a CLI-facing caller should use.
    ///
    /// Configuration mistakes return status 2. Failures of an individual
    /// dispatch return status 1.
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. }
            | Self::InvalidPattern { .. }
            | Self::RouteConflict { .. }
            | Self::UnsupportedDispatch { .. } => 2,
            Self::ConversionFailed { .. } | Self::Invocation { .. } => 1,
        }
    }

    /// Returns `true` for failures raised while building the registry.
    pub const fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::InvalidPattern { .. } | Self::RouteConflict { .. }
        )
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source: Box::new(source),
        }
    }

    /// Creates a route conflict error.
    pub fn route_conflict(route: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::RouteConflict {
            route: route.into(),
            existing: existing.into(),
        }
    }

    /// Creates an unsupported dispatch error.
    pub fn unsupported_dispatch(pattern: impl Into<String>) -> Self {
        Self::UnsupportedDispatch {
            pattern: pattern.into(),
        }
    }

    /// Creates a conversion failure.
    pub fn conversion(kind: ParamKind, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConversionFailed {
            kind,
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates an invocation failure.
    pub fn invocation(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invocation {
            method: method.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests;
