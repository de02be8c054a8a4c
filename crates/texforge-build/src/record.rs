//! Fingerprints of compiled sources, persisted as JSON next to the output.

use crate::{CompileJob, Engine};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const RECORD_FILENAME: &str = "texforge-build.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub version: String,
    /// tex path -> sha256 of the source that produced the current PDF
    pub entries: BTreeMap<String, String>,
}

impl BuildRecord {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("failed to write {:?}", path))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
        let record: Self = serde_json::from_str(&content)?;
        Ok(record)
    }

    /// Loads the record, or starts an empty one if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Whether the job's PDF exists and was built from the same source.
    pub fn is_current(&self, job: &CompileJob) -> bool {
        let key = job.tex_path().to_string_lossy().into_owned();
        job.pdf_path().is_file()
            && self.entries.get(&key).is_some_and(|hash| *hash == job.fingerprint())
    }

    pub fn update(&mut self, job: &CompileJob) {
        let key = job.tex_path().to_string_lossy().into_owned();
        self.entries.insert(key, job.fingerprint());
    }

    /// Compiles `job` unless it is current. Returns `None` when skipped.
    ///
    /// Only successful runs are recorded.
    pub fn compile_if_changed(&mut self, engine: &dyn Engine, job: &CompileJob) -> Result<Option<i32>> {
        if self.is_current(job) {
            info!("{:?} is up to date", job.pdf_path());
            return Ok(None);
        }
        let status = engine.compile(job)?;
        if status == 0 {
            self.update(job);
        }
        Ok(Some(status))
    }
}
