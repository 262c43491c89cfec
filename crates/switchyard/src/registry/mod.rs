//! Route storage, lookup and binding.
//!
//! The [`ActionRegistry`] owns the route table for one hosting application.
//! Routes live in an immutable snapshot behind an `Arc`: lookups clone the
//! current snapshot and match against it without holding any lock, while
//! writers serialize on a mutex, build the next snapshot and publish it in
//! one swap. A registration that adds several overloads is therefore either
//! fully visible or not visible at all.
//!
//! Lookup returns the first template whose pattern matches. With the default
//! [`LookupOrder::Registration`] the declared priority of an action is not
//! consulted; [`LookupOrder::Priority`] opts into trying higher priorities
//! first.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use switchyard_config::{LookupOrder, RegistryConfig};
use tracing::{debug, trace, warn};

use crate::action::{Action, BoundAction, Mode};
use crate::application::Application;
use crate::command_line::CommandLine;
use crate::error::DispatchError;
use crate::method::{MethodCache, ObjectCache, ParamKind};
use crate::{REGISTRY_TARGET, pattern};

/// Structured identity of a route: its prefix and parameter kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    prefix: String,
    kinds: Vec<ParamKind>,
}

impl RouteKey {
    /// Creates a key.
    pub fn new(prefix: impl Into<String>, kinds: Vec<ParamKind>) -> Self {
        Self {
            prefix: prefix.into(),
            kinds,
        }
    }

    /// Literal path prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parameter kinds in positional order.
    pub fn kinds(&self) -> &[ParamKind] {
        &self.kinds
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.kinds.len()
    }

    fn of(action: &Action) -> Option<Self> {
        action
            .pattern()
            .map(|pattern| Self::new(pattern.prefix(), pattern.kinds().to_vec()))
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self.kinds.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.prefix, kinds.join(", "))
    }
}

#[derive(Default)]
struct RouteTable {
    entries: Vec<(RouteKey, Arc<Action>)>,
}

impl RouteTable {
    fn position(&self, key: &RouteKey) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == key)
    }

    fn get(&self, key: &RouteKey) -> Option<&Arc<Action>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, action)| action)
    }
}

/// Thread-safe store of route templates and CLI metadata.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use switchyard::{ActionRegistry, Application, MethodDescriptor, ParamKind, Value};
///
/// struct Greeter;
///
/// impl Application for Greeter {
///     fn name(&self) -> &str {
///         "greeter"
///     }
///
///     fn overloads(&self, method: &str) -> Vec<MethodDescriptor> {
///         match method {
///             "greet" => vec![MethodDescriptor::for_type::<Greeter, _>(
///                 "greet",
///                 vec![ParamKind::Int],
///                 |_, args| {
///                     let n = args.first().and_then(Value::as_i32).unwrap_or_default();
///                     Ok(Value::from(format!("hello #{n}")))
///                 },
///             )],
///             _ => Vec::new(),
///         }
///     }
/// }
///
/// let registry = ActionRegistry::new();
/// let owner: Arc<dyn Application> = Arc::new(Greeter);
/// registry.register(&owner, "greet", "greet").unwrap();
///
/// let action = registry.lookup("greet/42").unwrap();
/// assert_eq!(action.execute().unwrap(), Value::from("hello #42"));
/// assert!(registry.lookup("greet/abc").is_none());
/// ```
pub struct ActionRegistry {
    routes: RwLock<Arc<RouteTable>>,
    commands: RwLock<HashMap<String, Arc<CommandLine>>>,
    writer: Mutex<()>,
    next_id: AtomicU64,
    methods: MethodCache,
    config: RegistryConfig,
}

impl ActionRegistry {
    /// Creates an empty registry with default behaviour.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry with the given behaviour.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_method_cache(config, MethodCache::new())
    }

    /// Creates an empty registry whose method cache uses `store`.
    #[must_use]
    pub fn with_object_cache(config: RegistryConfig, store: Arc<dyn ObjectCache>) -> Self {
        Self::with_method_cache(config, MethodCache::with_store(store))
    }

    fn with_method_cache(config: RegistryConfig, methods: MethodCache) -> Self {
        Self {
            routes: RwLock::new(Arc::new(RouteTable::default())),
            commands: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
            next_id: AtomicU64::new(1),
            methods,
            config,
        }
    }

    /// Behaviour switches in effect.
    pub const fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Registers every overload of `method` on `owner` under `prefix` for all
    /// channels.
    ///
    /// # Errors
    ///
    /// See [`ActionRegistry::register_with_mode`].
    pub fn register(
        &self,
        owner: &Arc<dyn Application>,
        prefix: &str,
        method: &str,
    ) -> Result<usize, DispatchError> {
        self.register_with_mode(owner, prefix, method, Mode::All)
    }

    /// Registers every overload of `method` on `owner` under `prefix`.
    ///
    /// One route is published per overload, all at once. CLI metadata the
    /// owner declares for `prefix` is stored alongside. Returns the number of
    /// routes added.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArgument`] when `prefix` or `method`
    /// is blank, [`DispatchError::InvalidPattern`] when a route pattern does
    /// not compile, and [`DispatchError::RouteConflict`] when an overload
    /// would take a route that is already registered. Nothing is published
    /// on error.
    pub fn register_with_mode(
        &self,
        owner: &Arc<dyn Application>,
        prefix: &str,
        method: &str,
        mode: Mode,
    ) -> Result<usize, DispatchError> {
        if prefix.trim().is_empty() {
            return Err(DispatchError::invalid_argument("path prefix is required"));
        }
        if method.trim().is_empty() {
            return Err(DispatchError::invalid_argument("method name is required"));
        }

        let overloads = self.methods.overloads(owner.as_ref(), method);
        let _guard = self.writer.lock();
        let current = self.snapshot();

        let mut staged: Vec<(RouteKey, Action)> = Vec::with_capacity(overloads.len());
        for descriptor in overloads.iter() {
            let compiled = pattern::compile(prefix, descriptor.params())?;
            let key = RouteKey::new(prefix, descriptor.params().to_vec());
            if let Some(existing) = current.get(&key) {
                let holder = existing.method().map_or("<none>", |m| m.name());
                return Err(DispatchError::route_conflict(key.to_string(), holder));
            }
            if staged.iter().any(|(staged_key, _)| *staged_key == key) {
                return Err(DispatchError::route_conflict(key.to_string(), method));
            }
            let action = Action::builder(Arc::clone(owner))
                .pattern(compiled)
                .method(descriptor.clone())
                .mode(mode)
                .build();
            staged.push((key, action));
        }

        if staged.is_empty() {
            warn!(
                target: REGISTRY_TARGET,
                owner = owner.name(),
                prefix,
                method,
                "no overloads declared; nothing registered"
            );
        } else {
            let mut next = RouteTable {
                entries: current.entries.clone(),
            };
            for (key, action) in staged {
                let action = action.with_id(self.next_id.fetch_add(1, Ordering::Relaxed));
                next.entries.push((key, Arc::new(action)));
            }
            let added = next.entries.len() - current.entries.len();
            *self.routes.write() = Arc::new(next);
            debug!(
                target: REGISTRY_TARGET,
                owner = owner.name(),
                prefix,
                method,
                routes = added,
                "registered routes"
            );
        }

        if let Some(command) = owner.cli_metadata(prefix) {
            self.commands
                .write()
                .insert(prefix.to_owned(), Arc::new(command));
        }

        Ok(overloads.len())
    }

    /// Stores a hand-built template, replacing any template on the same route.
    ///
    /// Returns the replaced template.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArgument`] when the action has no
    /// pattern.
    pub fn register_unit(&self, action: Action) -> Result<Option<Arc<Action>>, DispatchError> {
        let key = RouteKey::of(&action)
            .ok_or_else(|| DispatchError::invalid_argument("action pattern is required"))?;

        let _guard = self.writer.lock();
        let current = self.snapshot();
        let mut next = RouteTable {
            entries: current.entries.clone(),
        };
        let action = Arc::new(action.with_id(self.next_id.fetch_add(1, Ordering::Relaxed)));
        let replaced = match next.position(&key) {
            Some(index) => next
                .entries
                .get_mut(index)
                .map(|slot| std::mem::replace(&mut slot.1, action)),
            None => {
                next.entries.push((key.clone(), action));
                None
            }
        };
        *self.routes.write() = Arc::new(next);

        if replaced.is_some() {
            warn!(target: REGISTRY_TARGET, route = %key, "replaced existing route");
        } else {
            debug!(target: REGISTRY_TARGET, route = %key, "registered route");
        }
        Ok(replaced)
    }

    /// Stores CLI metadata for its path, returning the previous record.
    pub fn register_command_line(&self, command: CommandLine) -> Option<Arc<CommandLine>> {
        self.commands
            .write()
            .insert(command.path().to_owned(), Arc::new(command))
    }

    /// Finds the first template matching `path` and binds its arguments.
    pub fn lookup(&self, path: &str) -> Option<BoundAction> {
        self.find(path, |_| true)
    }

    /// Like [`ActionRegistry::lookup`], skipping templates whose mode does not
    /// accept `mode`.
    pub fn lookup_in_mode(&self, path: &str, mode: Mode) -> Option<BoundAction> {
        self.find(path, |action| action.mode().accepts(mode))
    }

    /// Looks up `path`, retrying once without a trailing slash.
    ///
    /// The retry is skipped when trailing slash fallback is disabled.
    pub fn lookup_with_fallback(&self, path: &str) -> Option<BoundAction> {
        self.lookup(path).or_else(|| {
            if !self.config.trailing_slash_fallback {
                return None;
            }
            path.strip_suffix('/')
                .and_then(|trimmed| self.lookup(trimmed))
        })
    }

    /// Returns the CLI metadata stored for `path`.
    pub fn cli_metadata(&self, path: &str) -> Option<Arc<CommandLine>> {
        self.commands.read().get(path).cloned()
    }

    /// Returns every stored CLI metadata record, ordered by path.
    pub fn command_lines(&self) -> Vec<Arc<CommandLine>> {
        let mut commands: Vec<Arc<CommandLine>> = self.commands.read().values().cloned().collect();
        commands.sort_by(|a, b| a.path().cmp(b.path()));
        commands
    }

    /// Removes every route registered under `prefix` and its CLI metadata.
    ///
    /// Returns the number of routes removed.
    pub fn remove(&self, prefix: &str) -> usize {
        let _guard = self.writer.lock();
        let current = self.snapshot();
        let kept: Vec<(RouteKey, Arc<Action>)> = current
            .entries
            .iter()
            .filter(|(key, _)| key.prefix() != prefix)
            .cloned()
            .collect();
        let removed = current.entries.len() - kept.len();
        if removed > 0 {
            *self.routes.write() = Arc::new(RouteTable { entries: kept });
        }
        self.commands.write().remove(prefix);
        debug!(target: REGISTRY_TARGET, prefix, removed, "removed routes");
        removed
    }

    /// Read-only snapshot of every template, in table order.
    pub fn list(&self) -> Vec<Arc<Action>> {
        self.snapshot()
            .entries
            .iter()
            .map(|(_, action)| Arc::clone(action))
            .collect()
    }

    /// Route keys in table order.
    pub fn routes(&self) -> Vec<RouteKey> {
        self.snapshot()
            .entries
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of stored templates.
    pub fn len(&self) -> usize {
        self.routes.read().entries.len()
    }

    /// Returns `true` when no templates are stored.
    pub fn is_empty(&self) -> bool {
        self.routes.read().entries.is_empty()
    }

    fn snapshot(&self) -> Arc<RouteTable> {
        Arc::clone(&self.routes.read())
    }

    fn find<F>(&self, path: &str, accept: F) -> Option<BoundAction>
    where
        F: Fn(&Action) -> bool,
    {
        let table = self.snapshot();
        let mut candidates = table
            .entries
            .iter()
            .filter_map(|(_, action)| accept(action).then_some(action));

        let bound = match self.config.lookup_order {
            LookupOrder::Registration => candidates.find_map(|action| bind_match(action, path)),
            LookupOrder::Priority => {
                let mut ranked: Vec<&Arc<Action>> = candidates.collect();
                ranked.sort_by_key(|action| Reverse(action.priority()));
                ranked
                    .into_iter()
                    .find_map(|action| bind_match(action, path))
            }
        };

        match &bound {
            Some(action) => debug!(
                target: REGISTRY_TARGET,
                path,
                pattern = action.template().pattern_text(),
                "matched route"
            ),
            None => trace!(target: REGISTRY_TARGET, path, "no route matched"),
        }
        bound
    }
}

fn bind_match(action: &Arc<Action>, path: &str) -> Option<BoundAction> {
    let arguments = action.pattern()?.captures(path)?;
    Some(action.bind(arguments))
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("routes", &self.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
