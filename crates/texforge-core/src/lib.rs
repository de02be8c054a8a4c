//! # TeXForge Core
//!
//! Fluent builders that assemble LaTeX documents as plain text.
//!
//! ## Overview
//!
//! Content is produced by small builders (equations, tables, figures,
//! TikZ drawings and pgfplots axes). Each builder implements [`Texable`]: it
//! renders its own body lines and declares the packages and preamble
//! commands it depends on. A [`Document`] collects the builders, merges
//! their declarations into a deduplicated preamble and renders the complete
//! source. Compiling that source is left to the `texforge-build` crate.
//!
//! ## Modules
//!
//! - [`package`] - Package declarations and the merge engine
//! - [`preamble`] - Preamble entries and their merge rules
//! - [`equation`] - Display math with automatic sub-labels
//! - [`table`] - `tabular`/`longtable` layout with aligned columns
//! - [`figure`], [`tikz`], [`plot`] - Floats, TikZ pictures and pgfplots axes
//! - [`document`] - Aggregation and rendering
//! - [`settings`], [`config`] - Explicit settings and persisted defaults
//! - [`diagnostics`] - Non-fatal findings such as incompatible packages
//!
//! ## Examples
//!
//! ```
//! use texforge_core::equation::{Environment, Equation};
//! use texforge_core::table::Table;
//! use texforge_core::Document;
//!
//! let mut doc = Document::new();
//! doc.title("Report").section("Data", None);
//! doc.add(
//!     &Table::new()
//!         .format(["l", "r"])
//!         .row(0, ["x", "1"])
//!         .caption("Values"),
//! )?;
//! doc.add(
//!     &Equation::new()
//!         .environment(Environment::Align, false)
//!         .line("a &= b", true)
//!         .label("ab"),
//! )?;
//!
//! let rendered = doc.render();
//! assert!(rendered.diagnostics.is_empty());
//! assert!(rendered.source.starts_with("% !TEX program = lualatex"));
//! assert!(rendered.source.contains("\\usepackage{booktabs}"));
//! # Ok::<(), texforge_core::Error>(())
//! ```
//!
//! ## Errors and diagnostics
//!
//! Invalid values and impossible compositions are reported as [`Error`].
//! Problems that do not prevent rendering, such as packages declared as
//! incompatible, are collected as [`diagnostics::Diagnostic`]s and are also
//! forwarded to the `log` facade. The crate never installs a logger.

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod equation;
pub mod error;
pub mod figure;
pub mod markup;
pub mod options;
pub mod package;
pub mod plot;
pub mod preamble;
pub mod settings;
pub mod table;
pub mod texable;
pub mod tikz;

pub use document::{Document, Rendered};
pub use error::{Error, Result};
pub use package::Package;
pub use preamble::PreambleEntry;
pub use settings::{Settings, TexEngine};
pub use texable::Texable;
