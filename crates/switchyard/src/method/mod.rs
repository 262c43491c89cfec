//! Method descriptors and the overload cache.
//!
//! Applications declare their routable methods as [`MethodDescriptor`]
//! values: a name, the ordered parameter kinds, a return kind, and a typed
//! closure that performs the call. The [`MethodCache`] memoizes the overload
//! list per `(owner type, method name)` so an application is asked at most
//! once per method, however many prefixes route to it.

mod cache;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::application::Application;
use crate::value::Value;

pub use self::cache::{MemoryCache, MethodCache, ObjectCache};

/// Error type returned by method handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Handler = dyn Fn(&dyn Application, &[Value]) -> Result<Value, BoxError> + Send + Sync;

/// Constants accepted by an enum parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumSpec {
    name: &'static str,
    constants: &'static [&'static str],
}

impl EnumSpec {
    /// Declares an enum type and its constant names.
    pub const fn new(name: &'static str, constants: &'static [&'static str]) -> Self {
        Self { name, constants }
    }

    /// Enum type name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared constant names, in declaration order.
    pub const fn constants(&self) -> &'static [&'static str] {
        self.constants
    }

    /// Returns the constant whose name equals `raw` exactly.
    pub fn constant(&self, raw: &str) -> Option<&'static str> {
        self.constants.iter().copied().find(|constant| *constant == raw)
    }
}

/// Declared type of a method parameter.
///
/// The kind selects both the pattern alternative used to capture the
/// argument and the conversion applied before invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// `i32`.
    Int,
    /// `i64`.
    Long,
    /// `i16`.
    Short,
    /// `i8`.
    Byte,
    /// `f32`.
    Float,
    /// `f64`.
    Double,
    /// `bool`.
    Boolean,
    /// `char`.
    Char,
    /// Timestamp.
    Date,
    /// One of a fixed set of constant names.
    Enum(EnumSpec),
    /// Unconverted text.
    Text,
    /// The current request object.
    Request,
    /// The current response object.
    Response,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Short => f.write_str("short"),
            Self::Byte => f.write_str("byte"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::Boolean => f.write_str("boolean"),
            Self::Char => f.write_str("char"),
            Self::Date => f.write_str("date"),
            Self::Enum(spec) => write!(f, "enum {}", spec.name()),
            Self::Text => f.write_str("text"),
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// Whether a method produces a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnKind {
    /// The handler result is returned to the caller.
    #[default]
    Value,
    /// The handler result is discarded and the receiver is cleaned up.
    Void,
}

/// A routable method overload.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: Arc<str>,
    params: Arc<[ParamKind]>,
    returns: ReturnKind,
    handler: Arc<Handler>,
}

impl MethodDescriptor {
    /// Creates a descriptor whose handler accepts any receiver.
    pub fn new<F>(name: &str, params: Vec<ParamKind>, handler: F) -> Self
    where
        F: Fn(&dyn Application, &[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            params: Arc::from(params),
            returns: ReturnKind::Value,
            handler: Arc::new(handler),
        }
    }

    /// Creates a descriptor whose handler receives the concrete type `T`.
    ///
    /// Invoking it on a receiver of another type fails with an error rather
    /// than panicking.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard::{Application, MethodDescriptor, ParamKind, Value};
    ///
    /// struct Counter;
    ///
    /// impl Application for Counter {
    ///     fn name(&self) -> &str {
    ///         "counter"
    ///     }
    ///
    ///     fn overloads(&self, method: &str) -> Vec<MethodDescriptor> {
    ///         match method {
    ///             "double" => vec![MethodDescriptor::for_type::<Counter, _>(
    ///                 "double",
    ///                 vec![ParamKind::Int],
    ///                 |_, args| Ok(Value::from(args.first().and_then(Value::as_i32).unwrap_or(0) * 2)),
    ///             )],
    ///             _ => Vec::new(),
    ///         }
    ///     }
    /// }
    ///
    /// let overloads = Counter.overloads("double");
    /// let result = overloads[0].call(&Counter, &[Value::Int(21)]).unwrap();
    /// assert_eq!(result, Value::Int(42));
    /// ```
    pub fn for_type<T, F>(name: &str, params: Vec<ParamKind>, handler: F) -> Self
    where
        T: Application,
        F: Fn(&T, &[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::new(name, params, move |receiver: &dyn Application, args: &[Value]| {
            let any: &dyn Any = receiver;
            match any.downcast_ref::<T>() {
                Some(target) => handler(target, args),
                None => Err(format!(
                    "receiver '{}' is not a {}",
                    receiver.name(),
                    std::any::type_name::<T>()
                )
                .into()),
            }
        })
    }

    /// Marks the method as void.
    #[must_use]
    pub const fn void(mut self) -> Self {
        self.returns = ReturnKind::Void;
        self
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter kinds, in positional order.
    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared return kind.
    pub const fn returns(&self) -> ReturnKind {
        self.returns
    }

    /// Calls the handler on `receiver` with converted arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler reports.
    pub fn call(&self, receiver: &dyn Application, args: &[Value]) -> Result<Value, BoxError> {
        (self.handler)(receiver, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}
