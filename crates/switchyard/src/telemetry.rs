//! Structured logging for hosts embedding the dispatch core.
//!
//! The core emits `tracing` events under [`REGISTRY_TARGET`] and
//! [`DISPATCH_TARGET`]. The host's `log_filter` applies to everything; when
//! `route_log_level` is set, [`filter_directives`] appends a directive for
//! each of the two targets so route selection can be traced without raising
//! the level of every other crate.
//!
//! Hosts without a subscriber of their own call [`initialise`] once at
//! start-up. [`subscriber`] builds the same subscriber around any writer for
//! hosts that install it themselves.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};

use switchyard_config::{Config, LogFormat};

use crate::{DISPATCH_TARGET, REGISTRY_TARGET};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The combined filter expression did not parse.
    #[error("invalid log filter '{directives}': {message}")]
    Filter {
        /// Directives built from the configuration.
        directives: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Returns the filter directives described by `config`.
///
/// # Examples
///
/// ```rust
/// use switchyard::telemetry::filter_directives;
/// use switchyard_config::Config;
///
/// let config = Config {
///     log_filter: "warn".to_owned(),
///     route_log_level: Some("trace".to_owned()),
///     ..Config::default()
/// };
/// assert_eq!(
///     filter_directives(&config),
///     "warn,switchyard::registry=trace,switchyard::dispatch=trace"
/// );
/// ```
pub fn filter_directives(config: &Config) -> String {
    let routes = config
        .route_log_level()
        .map(|level| [REGISTRY_TARGET, DISPATCH_TARGET].map(|target| format!("{target}={level}")));

    std::iter::once(config.log_filter().trim().to_owned())
        .chain(routes.into_iter().flatten())
        .filter(|directive| !directive.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Builds the subscriber described by `config`, writing to `writer`.
///
/// ANSI colouring is disabled; [`initialise`] enables it when stderr is a
/// terminal.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the directives do not parse.
pub fn subscriber<W>(
    config: &Config,
    writer: W,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    build_subscriber(config, writer, false)
}

/// Installs the global tracing subscriber described by `config`.
///
/// Only the first successful call installs anything; later calls return a
/// fresh handle without touching global state.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] when the host already installed a
/// subscriber.
///
/// # Examples
///
/// ```rust
/// use switchyard::telemetry;
/// use switchyard_config::Config;
///
/// # fn main() -> Result<(), switchyard::telemetry::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// drop((first, second));
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            let subscriber = build_subscriber(config, io::stderr, io::stderr().is_terminal())?;
            tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
        })
        .map(|_| TelemetryHandle)
}

fn build_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    let directives = filter_directives(config);
    EnvFilter::try_new(&directives).map_err(|error| TelemetryError::Filter {
        message: error.to_string(),
        directives,
    })
}

fn build_subscriber<W>(
    config: &Config,
    writer: W,
    ansi: bool,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let builder = fmt::Subscriber::builder()
        .with_env_filter(build_filter(config)?)
        .with_target(true)
        .with_level(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use rstest::rstest;

    use super::*;
    use crate::registry::ActionRegistry;
    use crate::tests::support::{Greeter, owner};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'writer> MakeWriter<'writer> for Captured {
        type Writer = Self;

        fn make_writer(&'writer self) -> Self::Writer {
            self.clone()
        }
    }

    fn config(filter: &str, route_level: Option<&str>, format: LogFormat) -> Config {
        Config {
            log_filter: filter.to_owned(),
            log_format: format,
            route_log_level: route_level.map(str::to_owned),
            ..Config::default()
        }
    }

    fn capture<F: FnOnce()>(config: &Config, body: F) -> String {
        let captured = Captured::default();
        let subscriber = subscriber(config, captured.clone()).expect("valid filter");
        tracing::subscriber::with_default(subscriber, body);
        captured.text()
    }

    fn register_and_dispatch(method: &str, path: &str) {
        let registry = ActionRegistry::new();
        let greeter = Arc::new(Greeter::new("alice"));
        registry
            .register(&owner(&greeter), method, method)
            .expect("registration succeeds");
        if let Some(action) = registry.lookup(path) {
            action.execute().expect("dispatch");
        }
    }

    #[rstest]
    #[case::host_filter_only("info", None, "info")]
    #[case::blank_host_filter(" ", Some("debug"), "switchyard::registry=debug,switchyard::dispatch=debug")]
    #[case::appended("warn", Some("trace"), "warn,switchyard::registry=trace,switchyard::dispatch=trace")]
    fn route_level_adds_target_directives(
        #[case] filter: &str,
        #[case] route_level: Option<&str>,
        #[case] expected: &str,
    ) {
        let config = config(filter, route_level, LogFormat::Compact);
        assert_eq!(filter_directives(&config), expected);
        assert!(build_filter(&config).is_ok());
    }

    #[rstest]
    #[case::host_filter("switchyard=notalevel", None)]
    #[case::route_level("info", Some("loud"))]
    fn malformed_directives_are_reported(#[case] filter: &str, #[case] route_level: Option<&str>) {
        let config = config(filter, route_level, LogFormat::Compact);
        let error = build_filter(&config).expect_err("filter should be rejected");
        assert!(matches!(error, TelemetryError::Filter { .. }));
        assert!(error.to_string().contains(filter.trim()));
    }

    #[test]
    fn route_level_exposes_registry_and_dispatch_events() {
        let config = config("warn", Some("debug"), LogFormat::Compact);
        let output = capture(&config, || register_and_dispatch("greet", "greet/42"));

        assert!(output.contains(REGISTRY_TARGET), "missing registry events: {output}");
        assert!(output.contains("registered routes"), "missing registration: {output}");
        assert!(output.contains(DISPATCH_TARGET), "missing dispatch events: {output}");
        assert!(output.contains("invoking action"), "missing invocation: {output}");
    }

    #[test]
    fn host_filter_hides_debug_events_without_route_level() {
        let config = config("warn", None, LogFormat::Compact);
        let output = capture(&config, || register_and_dispatch("greet", "greet/42"));
        assert!(!output.contains("registered routes"), "unexpected debug output: {output}");

        let warned = capture(&config, || register_and_dispatch("missing", "missing"));
        assert!(warned.contains("nothing registered"), "missing warning: {warned}");
    }

    #[test]
    fn json_events_are_flattened_with_their_target() {
        let config = config("warn", Some("debug"), LogFormat::Json);
        let output = capture(&config, || register_and_dispatch("greet", "greet/42"));

        let dispatch_line = output
            .lines()
            .find(|line| line.contains("invoking action"))
            .expect("dispatch event logged");
        assert!(dispatch_line.starts_with('{'), "not json: {dispatch_line}");
        assert!(dispatch_line.contains(&format!("\"target\":\"{DISPATCH_TARGET}\"")));
        assert!(dispatch_line.contains("\"method\":\"greet\""));
    }
}
