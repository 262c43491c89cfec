//! CLI metadata records stored alongside routes.
//!
//! The registry keeps these records keyed by path for CLI-facing layers that
//! print usage. Their content is never interpreted by the dispatch core.

use serde::{Deserialize, Serialize};

/// A named option accepted by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOption {
    name: String,
    description: String,
}

impl CommandOption {
    /// Creates an option description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Option name, for example `--to`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Usage description for a CLI path.
///
/// # Example
///
/// ```
/// use switchyard::CommandLine;
///
/// let command = CommandLine::new("greet", "Prints a greeting")
///     .with_option("--to", "Who to greet");
/// assert_eq!(command.options().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    path: String,
    description: String,
    #[serde(default)]
    options: Vec<CommandOption>,
}

impl CommandLine {
    /// Creates a record for `path`.
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            options: Vec::new(),
        }
    }

    /// Adds a named option.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.options.push(CommandOption::new(name, description));
        self
    }

    /// Path the record describes.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Command summary.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared named options.
    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }
}
