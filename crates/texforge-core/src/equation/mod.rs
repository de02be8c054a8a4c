//! Display math built from lines and nested math environments.
//!
//! ## Overview
//!
//! An [`Equation`] is an ordered list of entries. Each entry is either a
//! literal line of math or a nested equation whose environment is only
//! valid inside math mode (`cases`, `aligned`, `split`, ...). Every entry
//! records whether it ends a line, i.e. whether a `\\` follows it.
//!
//! ## Labels
//!
//! A label `L` is expanded into numbered sub-labels `eq:L-0`, `eq:L-1`, ...
//! Only entries that finish a statement receive one:
//!
//! - in single-statement environments (`equation`, `multline`) that is the
//!   last entry,
//! - otherwise every entry that ends its line, plus the last entry.
//!
//! Starred environments, math-mode-only environments and `\intertext`
//! lines never receive labels. With subequations enabled the outer
//! `subequations` block carries the plain `eq:L` label.
//!
//! ## Layout
//!
//! Literal lines are padded with spaces to a common column so that the
//! labels and `\\` markers of consecutive lines line up in the source.
//!
//! ## Examples
//!
//! ```
//! use texforge_core::equation::{Environment, Equation};
//! use texforge_core::Texable;
//!
//! let eq = Equation::new()
//!     .environment(Environment::Align, false)
//!     .line("a &= b", true)
//!     .line("c &= d", true)
//!     .label("maxwell");
//!
//! let lines = eq.lines()?;
//! assert!(lines[1].ends_with("\\label{eq:maxwell-0}\\\\%"));
//! assert!(lines[2].ends_with("\\label{eq:maxwell-1}"));
//! # Ok::<(), texforge_core::Error>(())
//! ```

mod environment;

pub use environment::Environment;

use crate::error::{Error, Result};
use crate::markup::indent;
use crate::package::Package;
use crate::preamble::PreambleEntry;
use crate::texable::Texable;

/// Label prefix for equations.
pub const LABEL_PREFIX: &str = "eq:";

/// The payload of one equation entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Line(String),
    Nested(Equation),
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    content: Content,
    ends_line: bool,
}

/// Builder for display math.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    environment: Environment,
    starred: bool,
    label: Option<String>,
    subequations: bool,
    columns: usize,
    entries: Vec<Entry>,
    packages: Vec<Package>,
    preamble: Vec<PreambleEntry>,
}

impl Default for Equation {
    fn default() -> Self {
        Self::new()
    }
}

impl Equation {
    /// An empty, unstarred `equation` environment.
    pub fn new() -> Self {
        Self {
            environment: Environment::Equation,
            starred: false,
            label: None,
            subequations: false,
            columns: 0,
            entries: Vec::new(),
            packages: vec![Package::named("amsmath").incompatible_with("breqn", "Equation")],
            preamble: Vec::new(),
        }
    }

    /// Selects the environment. `starred` is ignored for environments
    /// without a starred variant.
    pub fn environment(mut self, environment: Environment, starred: bool) -> Self {
        self.environment = environment;
        self.starred = starred && environment.can_be_starred();
        self
    }

    /// Has no effect for environments without a starred variant.
    pub fn starred(mut self, starred: bool) -> Self {
        self.starred = starred && self.environment.can_be_starred();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn without_label(mut self) -> Self {
        self.label = None;
        self
    }

    /// Column count for `alignat`/`alignedat`.
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Wraps the equation in a `subequations` block.
    pub fn use_subequations(mut self, subequations: bool) -> Self {
        self.subequations = subequations;
        self
    }

    pub fn line(mut self, text: impl Into<String>, ends_line: bool) -> Self {
        self.entries.push(Entry {
            content: Content::Line(text.into()),
            ends_line,
        });
        self
    }

    /// Adds several lines, each ending its line.
    pub fn add_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self = self.line(line, true);
        }
        self
    }

    /// Inserts a `\intertext` line. It is never labelled and never ends a line.
    pub fn intertext(self, text: &str) -> Self {
        self.line(format!("\\intertext{{{}}}", text), true)
    }

    /// Nests `child` inside this equation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] unless the child's environment is only valid
    /// inside math mode. Use [`Equation::replace_with`] to adopt a complete
    /// equation instead.
    pub fn nest(mut self, child: Equation, ends_line: bool) -> Result<Self> {
        if !child.environment.math_mode_only() {
            return Err(Error::usage(format!(
                "cannot use a {} environment inside a {} environment",
                child.environment, self.environment
            )));
        }
        self.entries.push(Entry {
            content: Content::Nested(child),
            ends_line,
        });
        Ok(self)
    }

    /// Adopts environment, label, subequations flag and content of `other`.
    ///
    /// Packages and preamble entries of both equations are kept.
    pub fn replace_with(mut self, other: Equation) -> Self {
        self.environment = other.environment;
        self.starred = other.starred;
        self.label = other.label;
        self.subequations = other.subequations;
        self.columns = other.columns;
        self.entries = other.entries;
        self.packages.extend(other.packages);
        self.preamble.extend(other.preamble);
        self
    }

    /// Declares an additional package needed by the math, e.g. `mathtools`.
    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    pub fn with_preamble_entry(mut self, entry: PreambleEntry) -> Self {
        self.preamble.push(entry);
        self
    }

    pub fn get_environment(&self) -> Environment {
        self.environment
    }

    pub fn get_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_starred(&self) -> bool {
        self.starred && self.environment.can_be_starred()
    }

    fn render(&self, outermost: bool) -> Result<Vec<String>> {
        let env = self.environment;
        let starred = self.is_starred();
        let label = if starred { None } else { self.label.as_deref() };
        if env.has_columns() && self.columns == 0 {
            return Err(Error::configuration(format!(
                "no valid number of columns specified for {}",
                env
            )));
        }

        let subequations = self.subequations && outermost;
        let star = if starred { "*" } else { "" };
        let mut out = Vec::new();
        let mut n = 1;

        if subequations {
            let block_label = label
                .map(|l| format!("\\label{{{}{}}}", LABEL_PREFIX, l))
                .unwrap_or_default();
            out.push(format!("{}\\begin{{subequations}}{}", indent(n), block_label));
            n += 1;
        }

        let columns = if env.has_columns() {
            format!("{{{}}}", self.columns)
        } else {
            String::new()
        };
        out.push(format!("{}\\begin{{{}{}}}{}%", indent(n), env, star, columns));

        let widths: Vec<usize> = self
            .entries
            .iter()
            .map(|entry| match &entry.content {
                Content::Line(text) => indent(n + 1).len() + text.chars().count(),
                Content::Nested(_) => 0,
            })
            .collect();
        let column = widths.iter().copied().max().unwrap_or(0) + 1;

        let last = self.entries.len().saturating_sub(1);
        let mut counter = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            let is_last = i == last;
            let eligible = if env.single_statement() {
                is_last
            } else {
                (entry.ends_line && !is_last) || is_last
            };
            let mut use_label = eligible && label.is_some() && !env.math_mode_only();
            let sub_label = label
                .map(|l| format!("\\label{{{}{}-{}}}", LABEL_PREFIX, l, counter))
                .unwrap_or_default();

            match &entry.content {
                Content::Nested(child) => {
                    for line in child.render(false)? {
                        out.push(format!("{}{}", indent(n), line));
                    }
                    if use_label {
                        out.push(format!("{}{}", indent(n + 1), sub_label));
                    }
                }
                Content::Line(text) => {
                    let mut ends_line = entry.ends_line;
                    if is_intertext(text) {
                        use_label = false;
                        ends_line = false;
                    }
                    let padding = " ".repeat(column - widths[i]);
                    out.push(format!(
                        "{}{}{}{}{}",
                        indent(n + 1),
                        text,
                        padding,
                        if use_label { sub_label.as_str() } else { "" },
                        if ends_line && !is_last { "\\\\%" } else { "" }
                    ));
                }
            }
            if use_label {
                counter += 1;
            }
        }

        out.push(format!("{}\\end{{{}{}}}%", indent(n), env, star));
        if subequations {
            out.push(format!("{}\\end{{subequations}}", indent(n - 1)));
        }
        Ok(out)
    }
}

fn is_intertext(text: &str) -> bool {
    let cleaned = text.replace('\t', "");
    let cleaned = cleaned.trim();
    cleaned.starts_with("\\intertext") && cleaned.ends_with('}')
}

impl Texable for Equation {
    fn packages(&self) -> Vec<Package> {
        let mut packages = self.packages.clone();
        for entry in &self.entries {
            if let Content::Nested(child) = &entry.content {
                packages.extend(child.packages());
            }
        }
        packages
    }

    fn preamble_entries(&self) -> Vec<PreambleEntry> {
        let mut entries = self.preamble.clone();
        for entry in &self.entries {
            if let Content::Nested(child) = &entry.content {
                entries.extend(child.preamble_entries());
            }
        }
        entries
    }

    fn lines(&self) -> Result<Vec<String>> {
        self.render(true)
    }
}

#[cfg(test)]
mod tests;
