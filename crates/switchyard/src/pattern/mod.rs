//! Route pattern synthesis.
//!
//! A route pattern is the literal path prefix followed by one capturing group
//! per declared parameter. The alternative inside each group is chosen by the
//! parameter kind, so `greet/42` reaches an `int` overload while `greet/abc`
//! does not.
//!
//! The prefix is inserted verbatim. Hosting applications may use regular
//! expression syntax in prefixes; an invalid result is reported when the
//! route is compiled, never at match time.

use std::fmt;

use regex::Regex;

use crate::error::DispatchError;
use crate::method::ParamKind;

/// Text placed before the prefix: an optional leading slash. There is no
/// start anchor, so a route matches at any offset within the path.
pub const PATTERN_START: &str = "/?";

/// Text placed after the last group.
pub const PATTERN_END: &str = "$";

/// Returns the alternative captured for a parameter of `kind`.
pub const fn alternative(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Int | ParamKind::Long | ParamKind::Short => r"-?\d+",
        ParamKind::Float | ParamKind::Double => r"-?\d+(\.\d+)?",
        ParamKind::Byte => r"\d+",
        ParamKind::Boolean => "true|false",
        ParamKind::Char => ".{1}",
        ParamKind::Date
        | ParamKind::Enum(_)
        | ParamKind::Text
        | ParamKind::Request
        | ParamKind::Response => ".*",
    }
}

/// Number of capturing groups nested inside [`alternative`] for `kind`.
const fn nested_groups(kind: ParamKind) -> usize {
    match kind {
        ParamKind::Float | ParamKind::Double => 1,
        _ => 0,
    }
}

/// Builds the pattern text for `prefix` and `kinds` without compiling it.
///
/// # Example
///
/// ```
/// use switchyard::ParamKind;
/// use switchyard::pattern::pattern_text;
///
/// assert_eq!(pattern_text("greet", &[]), "/?greet$");
/// assert_eq!(
///     pattern_text("greet", &[ParamKind::Int, ParamKind::Boolean]),
///     r"/?greet/(-?\d+)/(true|false)$"
/// );
/// ```
pub fn pattern_text(prefix: &str, kinds: &[ParamKind]) -> String {
    let mut text = format!("{PATTERN_START}{prefix}");
    if !kinds.is_empty() {
        let groups: Vec<String> = kinds
            .iter()
            .map(|kind| format!("({})", alternative(*kind)))
            .collect();
        text.push('/');
        text.push_str(&groups.join("/"));
    }
    text.push_str(PATTERN_END);
    text
}

/// Compiles the route pattern for `prefix` and `kinds`.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidPattern`] when the synthesised text is
/// not a valid regular expression.
pub fn compile(prefix: &str, kinds: &[ParamKind]) -> Result<CompiledPattern, DispatchError> {
    let text = pattern_text(prefix, kinds);
    let regex = Regex::new(&text).map_err(|source| DispatchError::invalid_pattern(&text, source))?;

    let parameter_groups: usize = kinds.iter().map(|kind| 1 + nested_groups(*kind)).sum();
    let prefix_groups = regex
        .captures_len()
        .saturating_sub(1)
        .saturating_sub(parameter_groups);

    let mut groups = Vec::with_capacity(kinds.len());
    let mut next = 1 + prefix_groups;
    for kind in kinds {
        groups.push(next);
        next += 1 + nested_groups(*kind);
    }

    Ok(CompiledPattern {
        prefix: prefix.to_owned(),
        kinds: kinds.to_vec(),
        text,
        regex,
        groups,
    })
}

/// A compiled route pattern.
#[derive(Clone)]
pub struct CompiledPattern {
    prefix: String,
    kinds: Vec<ParamKind>,
    text: String,
    regex: Regex,
    groups: Vec<usize>,
}

impl CompiledPattern {
    /// Literal prefix the pattern was built from.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parameter kinds the pattern captures.
    pub fn kinds(&self) -> &[ParamKind] {
        &self.kinds
    }

    /// Synthesised pattern text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns `true` when `path` matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captures one raw argument per parameter group.
    ///
    /// Returns `None` when `path` does not match. Groups that did not take
    /// part in the match are `None`; empty captures are kept as empty
    /// strings.
    pub fn captures(&self, path: &str) -> Option<Vec<Option<String>>> {
        let captures = self.regex.captures(path)?;
        Some(
            self.groups
                .iter()
                .map(|index| captures.get(*index).map(|m| m.as_str().to_owned()))
                .collect(),
        )
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("text", &self.text)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests;
