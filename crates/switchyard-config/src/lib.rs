//! Shared configuration for the switchyard dispatch core.
//!
//! Hosting applications build a [`Config`] once at start-up and hand the
//! relevant pieces to the registry and telemetry layers. Loading is layered
//! by `ortho_config`, lowest precedence first:
//!
//! 1. built-in defaults (see [`default_log_filter`] and friends),
//! 2. a TOML file named by `--config-path` or `SWITCHYARD_CONFIG_PATH`,
//! 3. `SWITCHYARD_*` environment variables,
//! 4. command-line flags such as `--lookup-order priority`.
//!
//! ```ignore
//! use switchyard_config::{Config, OrthoConfig};
//!
//! let config = Config::load()?;
//! let registry = switchyard::ActionRegistry::with_config(config.registry());
//! ```

mod defaults;
mod logging;
mod registry;

use serde::{Deserialize, Serialize};

pub use ortho_config::{OrthoConfig, OrthoError};

pub use self::defaults::{
    CONFIG_PATH_ENV, DEFAULT_LOG_FILTER, LOG_FILTER_ENV, LOG_FORMAT_ENV, LOOKUP_ORDER_ENV,
    ROUTE_LOG_LEVEL_ENV, TRAILING_SLASH_FALLBACK_ENV, default_log_filter, default_log_format,
    default_trailing_slash_fallback,
};
pub use self::logging::LogFormat;
pub use self::registry::{LookupOrder, RegistryConfig};

/// Top-level configuration consumed by the dispatch core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SWITCHYARD")]
pub struct Config {
    /// `tracing` filter expression, for example `info` or `switchyard=debug`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Output format for log events.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Level applied to the registry and dispatch targets on top of
    /// `log_filter`, for example `trace` while debugging route selection.
    #[serde(default)]
    pub route_log_level: Option<String>,
    /// Candidate ordering applied by registry lookups.
    #[serde(default)]
    pub lookup_order: LookupOrder,
    /// Whether fallback lookups retry without a trailing slash.
    #[serde(default = "default_trailing_slash_fallback")]
    pub trailing_slash_fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            log_format: default_log_format(),
            route_log_level: None,
            lookup_order: LookupOrder::default(),
            trailing_slash_fallback: default_trailing_slash_fallback(),
        }
    }
}

impl Config {
    /// Returns the configured log filter expression.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log format.
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the level override for the registry and dispatch targets.
    pub fn route_log_level(&self) -> Option<&str> {
        self.route_log_level.as_deref()
    }

    /// Returns the registry behaviour switches.
    pub const fn registry(&self) -> RegistryConfig {
        RegistryConfig {
            lookup_order: self.lookup_order,
            trailing_slash_fallback: self.trailing_slash_fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn args(flags: &[&str]) -> Vec<OsString> {
        std::iter::once("switchyard")
            .chain(flags.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn defaults_preserve_first_match_lookup() {
        let config = Config::default();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
        assert!(config.route_log_level().is_none());
        assert_eq!(config.registry(), RegistryConfig::default());
    }

    #[test]
    fn registry_switches_follow_the_flat_fields() {
        let config = Config {
            lookup_order: LookupOrder::Priority,
            trailing_slash_fallback: false,
            ..Config::default()
        };
        let expected = RegistryConfig::default()
            .with_lookup_order(LookupOrder::Priority)
            .with_trailing_slash_fallback(false);
        assert_eq!(config.registry(), expected);
    }

    #[rstest]
    #[case::lookup_order(&["--lookup-order", "priority"], LookupOrder::Priority, LogFormat::Json)]
    #[case::log_format(&["--log-format", "compact"], LookupOrder::Registration, LogFormat::Compact)]
    fn command_line_flags_are_applied(
        #[case] flags: &[&str],
        #[case] order: LookupOrder,
        #[case] format: LogFormat,
    ) {
        let config = Config::load_from_iter(args(flags)).expect("load configuration");
        assert_eq!(config.registry().lookup_order, order);
        assert_eq!(config.log_format(), format);
    }

    #[test]
    fn unknown_lookup_order_is_rejected() {
        let result = Config::load_from_iter(args(&["--lookup-order", "random"]));
        assert!(result.is_err(), "expected rejection, got {result:?}");
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("switchyard.toml");
        fs::write(&path, "lookup_order = ").expect("write malformed config");

        let error = Config::load_from_iter(args(&["--config-path", &path.to_string_lossy()]))
            .expect_err("loading must fail");

        let mentions_path = |candidate: &OrthoError| {
            matches!(candidate, OrthoError::File { path: reported, .. } if *reported == path)
        };
        match error.as_ref() {
            OrthoError::Aggregate(aggregate) => {
                assert!(aggregate.iter().any(mentions_path), "missing path: {error}");
            }
            other => assert!(mentions_path(other), "expected file error, got {other:?}"),
        }
    }
}
