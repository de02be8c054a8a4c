//! Non-fatal findings collected while assembling a document.
//!
//! Merging packages or closing environments can surface problems that do not
//! prevent rendering. They are collected here instead of being reported
//! through a global logger, so callers decide how to present them. Every
//! pushed diagnostic is also forwarded to the `log` facade.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
            Severity::Hint => "hint",
        };
        f.write_str(label)
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Ordered collection of [`Diagnostic`]s.
///
/// ```
/// use texforge_core::diagnostics::{Diagnostics, Severity};
///
/// let mut diagnostics = Diagnostics::new();
/// diagnostics.warning("environment itemize was never closed");
/// assert!(diagnostics.has_warnings());
/// assert_eq!(diagnostics.iter().next().unwrap().severity, Severity::Warning);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error | Severity::Warning => warn!("{}", message),
            Severity::Information | Severity::Hint => info!("{}", message),
        }
        self.entries.push(Diagnostic { severity, message });
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Information, message);
    }

    /// Appends all findings of `other`, keeping their order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|d| matches!(d.severity, Severity::Warning | Severity::Error))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
