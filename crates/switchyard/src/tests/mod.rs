//! Shared fixtures and behavioural suites for the dispatch core.

pub(crate) mod support;
