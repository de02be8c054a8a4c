//! Preamble entries: the commands between `\documentclass` and
//! `\begin{document}` that are not package imports.
//!
//! An entry is either *standalone*, in which case it is emitted verbatim at
//! its position, or *mergeable*. Mergeable entries that share a command are
//! collapsed into the slot of the first one, so that e.g. several builders
//! asking for `\usetikzlibrary{...}` produce a single line.

use crate::options::{join_options, Options};
use serde::{Deserialize, Serialize};

/// A blank line in the preamble.
pub const EMPTY_LINE: &str = "";
/// Separator between small groups of settings.
pub const MINOR_SEPARATOR: &str = "% ----------------";
/// Separator around the major preamble blocks.
pub const MAJOR_SEPARATOR: &str = "% ================";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreambleEntry {
    command: String,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    options: Options,
    #[serde(default = "standalone_default")]
    standalone: bool,
}

fn standalone_default() -> bool {
    true
}

impl PreambleEntry {
    /// A standalone entry emitted exactly as given.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            options: Options::new(),
            standalone: true,
        }
    }

    /// A mergeable entry; its options are unioned with other mergeable
    /// entries of the same command.
    pub fn mergeable(command: impl Into<String>) -> Self {
        Self::new(command).standalone(false)
    }

    pub fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Adds a flag option, rendered as `{flag}`.
    pub fn with_option(mut self, key: impl Into<String>) -> Self {
        self.options.insert(key.into(), String::new());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options.extend(options);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn is_standalone(&self) -> bool {
        self.standalone
    }

    /// The rendered preamble line.
    ///
    /// Options are appended in braces unless the command is blank or a
    /// comment.
    ///
    /// ```
    /// use texforge_core::preamble::PreambleEntry;
    ///
    /// let entry = PreambleEntry::mergeable("\\pgfplotsset").with_value("compat", "newest");
    /// assert_eq!(entry.line(), "\\pgfplotsset{compat=newest}");
    /// assert_eq!(PreambleEntry::new("% note").with_option("x").line(), "% note");
    /// ```
    pub fn line(&self) -> String {
        let options = join_options(&self.options);
        if self.command.starts_with('%') || self.command.trim().is_empty() || options.is_empty() {
            return self.command.clone();
        }
        format!("{}{{{}}}", self.command, options)
    }
}

/// Collapses mergeable entries that share a command.
///
/// Standalone entries pass through in order. A mergeable entry is folded
/// into the first earlier mergeable entry with the same command, later
/// option values winning; otherwise it is appended.
pub fn cleanup(entries: &[PreambleEntry]) -> Vec<PreambleEntry> {
    let mut cleaned: Vec<PreambleEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.standalone {
            cleaned.push(entry.clone());
            continue;
        }
        let slot = cleaned
            .iter_mut()
            .find(|e| !e.standalone && e.command == entry.command);
        match slot {
            Some(existing) => existing
                .options
                .extend(entry.options.iter().map(|(k, v)| (k.clone(), v.clone()))),
            None => cleaned.push(entry.clone()),
        }
    }
    cleaned
}
