//! # TeXForge Build
//!
//! Turns rendered documents into PDFs by running an external TeX engine.
//!
//! ## Overview
//!
//! A [`CompileJob`] captures everything needed to compile one document: the
//! source text, where to put it, how many engine passes to run and which
//! helper files to remove afterwards. An [`Engine`] executes the job.
//! [`ShellEngine`] is the only implementation; it drives `lualatex`,
//! `pdflatex` and friends through a [`CommandExecutor`], which tests swap
//! for [`MockCommandExecutor`].
//!
//! [`BuildRecord`] remembers the fingerprint of every successfully compiled
//! source so unchanged documents can be skipped.
//!
//! ## Examples
//!
//! ```no_run
//! use texforge_build::{CompileJob, Engine, ShellEngine};
//! use texforge_core::Document;
//!
//! let mut doc = Document::new();
//! doc.folder("out").filename("report").line("Hello");
//!
//! let engine = ShellEngine::for_document(&doc);
//! if engine.is_available() {
//!     let status = engine.compile(&CompileJob::from_document(&doc))?;
//!     println!("{} exited with {}", engine.name(), status);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use log::info;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::PathBuf;
use texforge_core::Document;
pub use texforge_core::TexEngine;

pub mod engine;
pub mod executor;
pub mod record;

pub use engine::ShellEngine;
pub use executor::{CommandExecutor, MockCommandExecutor, RealCommandExecutor};
pub use record::BuildRecord;

pub const DEFAULT_FILENAME: &str = "document";

/// Something that can compile a [`CompileJob`].
pub trait Engine {
    fn name(&self) -> &str;

    /// Whether the engine binary can be found.
    fn is_available(&self) -> bool;

    /// Compiles the job and returns the highest exit status of all passes.
    fn compile(&self, job: &CompileJob) -> anyhow::Result<i32>;
}

/// One document, ready to be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub source: String,
    pub output_dir: PathBuf,
    /// Base name without the `.tex` extension.
    pub filename: String,
    pub repeat: u32,
    pub bibliography: bool,
    /// Extensions of helper files removed after the last pass.
    pub clean: BTreeSet<String>,
}

impl CompileJob {
    pub fn new(source: impl Into<String>, output_dir: impl Into<PathBuf>, filename: &str) -> Self {
        Self {
            source: source.into(),
            output_dir: output_dir.into(),
            filename: base_name(filename),
            repeat: 1,
            bibliography: false,
            clean: BTreeSet::new(),
        }
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_bibliography(mut self, bibliography: bool) -> Self {
        self.bibliography = bibliography;
        self
    }

    pub fn with_clean<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clean = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Renders `document` and takes folder, filename, passes and cleanup
    /// from its settings.
    pub fn from_document(document: &Document) -> Self {
        let settings = document.settings();
        if settings.compiler_or_default() == TexEngine::LuaLatex {
            for package in ["fontspec", "unicode-math"] {
                if !document.has_package(package) {
                    info!("compiling with lualatex without the {} package", package);
                }
            }
        }

        let output_dir = match settings.folder.as_deref() {
            Some(folder) if !folder.is_empty() => PathBuf::from(folder),
            _ => PathBuf::from("."),
        };
        let filename = settings.filename.as_deref().unwrap_or(DEFAULT_FILENAME);
        let bibliography = settings.bibliography.unwrap_or(false) && settings.bibfile.is_some();

        Self::new(document.render().source, output_dir, filename)
            .with_repeat(settings.repeat_or_default())
            .with_bibliography(bibliography)
            .with_clean(settings.clean_extensions())
    }

    pub fn tex_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.tex", self.filename))
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", self.filename))
    }

    /// SHA-256 of the source, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn base_name(filename: &str) -> String {
    let name = filename.strip_suffix(".tex").unwrap_or(filename);
    if name.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        name.to_string()
    }
}
