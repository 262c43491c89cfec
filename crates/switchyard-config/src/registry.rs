//! Tunables consumed by the action registry.
//!
//! The defaults reproduce the historical behaviour of the dispatch core:
//! the first structurally matching route wins regardless of its declared
//! priority, and a single trailing slash is forgiven during fallback lookup.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::default_trailing_slash_fallback;

/// Order in which the registry tries candidate routes during lookup.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LookupOrder {
    /// Routes are tried in the order they were published. Priority is ignored.
    #[default]
    Registration,
    /// Routes are tried by descending priority; ties keep registration order.
    Priority,
}

/// Registry behaviour switches, assembled from [`crate::Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Candidate ordering applied by lookups.
    pub lookup_order: LookupOrder,
    /// Whether fallback lookups retry without a trailing slash.
    pub trailing_slash_fallback: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lookup_order: LookupOrder::default(),
            trailing_slash_fallback: default_trailing_slash_fallback(),
        }
    }
}

impl RegistryConfig {
    /// Returns a copy with the given lookup order.
    #[must_use]
    pub const fn with_lookup_order(mut self, lookup_order: LookupOrder) -> Self {
        self.lookup_order = lookup_order;
        self
    }

    /// Returns a copy with trailing slash fallback toggled.
    #[must_use]
    pub const fn with_trailing_slash_fallback(mut self, enabled: bool) -> Self {
        self.trailing_slash_fallback = enabled;
        self
    }
}
