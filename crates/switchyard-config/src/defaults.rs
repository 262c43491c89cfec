use crate::logging::LogFormat;

/// Default log filter expression used by hosting applications.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "SWITCHYARD_CONFIG_PATH";

/// Environment variable overriding the log filter.
pub const LOG_FILTER_ENV: &str = "SWITCHYARD_LOG_FILTER";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "SWITCHYARD_LOG_FORMAT";

/// Environment variable overriding the registry and dispatch log level.
pub const ROUTE_LOG_LEVEL_ENV: &str = "SWITCHYARD_ROUTE_LOG_LEVEL";

/// Environment variable overriding the registry lookup order.
pub const LOOKUP_ORDER_ENV: &str = "SWITCHYARD_LOOKUP_ORDER";

/// Environment variable toggling the trailing slash fallback.
pub const TRAILING_SLASH_FALLBACK_ENV: &str = "SWITCHYARD_TRAILING_SLASH_FALLBACK";

/// Default log filter expression.
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Fallback lookups forgive one trailing slash unless disabled.
pub const fn default_trailing_slash_fallback() -> bool {
    true
}
