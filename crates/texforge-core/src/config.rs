//! Persisted document defaults.
//!
//! A [`DocumentConfig`] is a JSON file holding the document class, package
//! declarations, preamble entries and [`Settings`] shared by several
//! documents. Applying it to a document uses the config as the base and lets
//! everything the document configured explicitly take precedence.
//!
//! ```json
//! {
//!   "documentclass": "scrartcl",
//!   "class_options": { "a4paper": "" },
//!   "settings": { "compiler": "pdflatex", "repeat": 2 },
//!   "packages": [ { "name": "siunitx", "options": { "locale": "UK" } } ]
//! }
//! ```

use crate::document::Document;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::package::Package;
use crate::preamble::PreambleEntry;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub documentclass: Option<String>,
    #[serde(skip_serializing_if = "Options::is_empty")]
    pub class_options: Options,
    pub settings: Settings,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_packages: Vec<Package>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preamble: Vec<PreambleEntry>,
}

impl DocumentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures everything but the body of `document`.
    pub fn from_document(document: &Document) -> Self {
        let documentclass = Some(document.get_documentclass().to_string());
        Self {
            documentclass,
            class_options: document.class_options().clone(),
            settings: document.settings().clone(),
            required_packages: document.required_packages().to_vec(),
            packages: document.packages().to_vec(),
            preamble: document.preamble().to_vec(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("loaded document config from {:?}", path);
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Rejects package declarations without a name.
    pub fn validate(&self) -> Result<()> {
        let blank = self
            .packages
            .iter()
            .chain(&self.required_packages)
            .any(|p| p.name().trim().is_empty());
        if blank {
            return Err(Error::configuration("package name must not be blank"));
        }
        Ok(())
    }

    /// A document configured from this config only.
    pub fn to_document(&self) -> Result<Document> {
        self.validate()?;
        let mut document = Document::new();
        document.set_settings(self.settings.clone());
        if let Some(class) = &self.documentclass {
            document.documentclass_with_options(class, self.class_options.clone());
        }
        for package in &self.required_packages {
            document.require_package(package.clone());
        }
        for package in &self.packages {
            document.use_package(package.clone());
        }
        for entry in &self.preamble {
            document.add_to_preamble(entry.clone());
        }
        Ok(document)
    }

    /// Uses this config as defaults for `document`. Whatever `document` set
    /// explicitly wins.
    pub fn apply(&self, document: &mut Document) -> Result<()> {
        let mut base = self.to_document()?;
        base.merge(document);
        *document = base;
        Ok(())
    }
}
