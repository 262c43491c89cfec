//! A small routable application used across the unit and behavioural tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

use crate::application::Application;
use crate::command_line::CommandLine;
use crate::context::Context;
use crate::method::{EnumSpec, MethodDescriptor, ParamKind};
use crate::value::Value;

pub(crate) const LEVEL: EnumSpec = EnumSpec::new("Level", &["Low", "High"]);

#[derive(Debug, Error)]
#[error("disk full")]
pub(crate) struct DiskFull;

#[derive(Debug, Error)]
#[error("greeting could not be stored")]
pub(crate) struct StoreFailure {
    #[source]
    source: DiskFull,
}

/// Test application exposing overloaded and failing methods.
pub(crate) struct Greeter {
    name: String,
    introspections: AtomicUsize,
    destroyed: AtomicUsize,
    touched: AtomicUsize,
    rendered: bool,
    context: Mutex<Option<Arc<dyn Context>>>,
    scoped: Option<Arc<dyn Application>>,
}

impl Greeter {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            introspections: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
            touched: AtomicUsize::new(0),
            rendered: false,
            context: Mutex::new(None),
            scoped: None,
        }
    }

    /// Makes void methods return the rendered state.
    pub(crate) fn rendering(mut self) -> Self {
        self.rendered = true;
        self
    }

    /// Routes calls made under a context to `scoped`.
    pub(crate) fn with_scoped(mut self, scoped: Arc<dyn Application>) -> Self {
        self.scoped = Some(scoped);
        self
    }

    pub(crate) fn set_context(&self, context: Arc<dyn Context>) {
        *self.context.lock() = Some(context);
    }

    pub(crate) fn introspections(&self) -> usize {
        self.introspections.load(Ordering::SeqCst)
    }

    pub(crate) fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub(crate) fn touched(&self) -> usize {
        self.touched.load(Ordering::SeqCst)
    }
}

/// Upcasts a shared greeter to the trait object the registry stores.
pub(crate) fn owner(greeter: &Arc<Greeter>) -> Arc<dyn Application> {
    Arc::clone(greeter) as Arc<dyn Application>
}

fn shown(args: &[Value], position: usize) -> String {
    args.get(position).map(ToString::to_string).unwrap_or_default()
}

impl Application for Greeter {
    fn name(&self) -> &str {
        &self.name
    }

    fn overloads(&self, method: &str) -> Vec<MethodDescriptor> {
        self.introspections.fetch_add(1, Ordering::SeqCst);
        match method {
            "greet" => vec![
                MethodDescriptor::for_type::<Self, _>("greet", vec![], |greeter, _| {
                    Ok(Value::from(format!("hello from {}", greeter.name)))
                }),
                MethodDescriptor::for_type::<Self, _>("greet", vec![ParamKind::Int], |greeter, args| {
                    Ok(Value::from(format!("{} greets #{}", greeter.name, shown(args, 0))))
                }),
                MethodDescriptor::for_type::<Self, _>(
                    "greet",
                    vec![ParamKind::Text, ParamKind::Int],
                    |_, args| Ok(Value::from(format!("hello {} #{}", shown(args, 0), shown(args, 1)))),
                ),
            ],
            "echo" => vec![MethodDescriptor::for_type::<Self, _>(
                "echo",
                vec![ParamKind::Text],
                |_, args| Ok(args.first().cloned().unwrap_or_default()),
            )],
            "level" => vec![MethodDescriptor::for_type::<Self, _>(
                "level",
                vec![ParamKind::Enum(LEVEL)],
                |_, args| Ok(args.first().cloned().unwrap_or_default()),
            )],
            "flag" => vec![MethodDescriptor::for_type::<Self, _>(
                "flag",
                vec![ParamKind::Boolean],
                |_, args| Ok(args.first().cloned().unwrap_or_default()),
            )],
            "inspect" => vec![MethodDescriptor::for_type::<Self, _>(
                "inspect",
                vec![ParamKind::Request],
                |_, args| Ok(args.first().cloned().unwrap_or_default()),
            )],
            "whoami" => vec![MethodDescriptor::for_type::<Self, _>(
                "whoami",
                vec![],
                |greeter, _| Ok(Value::from(greeter.name.as_str())),
            )],
            "touch" => vec![
                MethodDescriptor::for_type::<Self, _>("touch", vec![], |greeter, _| {
                    greeter.touched.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::from("discarded"))
                })
                .void(),
            ],
            "fail" => vec![MethodDescriptor::for_type::<Self, _>("fail", vec![], |_, _| {
                Err(StoreFailure { source: DiskFull }.into())
            })],
            "explode" => vec![MethodDescriptor::for_type::<Self, _>(
                "explode",
                vec![],
                |_, _| panic!("greeter exploded"),
            )],
            _ => Vec::new(),
        }
    }

    fn current_context(&self) -> Option<Arc<dyn Context>> {
        self.context.lock().clone()
    }

    fn context_bound_instance(&self, _context: &dyn Context) -> Option<Arc<dyn Application>> {
        self.scoped.clone()
    }

    fn destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }

    fn requires_rendered_output(&self) -> bool {
        self.rendered
    }

    fn render(&self) -> String {
        format!("{} rendered", self.name)
    }

    fn help(&self) -> Value {
        Value::from(format!("usage: greet [name] <count> ({})", self.name))
    }

    fn cli_metadata(&self, path: &str) -> Option<CommandLine> {
        (path == "greet").then(|| {
            CommandLine::new("greet", "Prints a greeting").with_option("--to", "Who to greet")
        })
    }
}
