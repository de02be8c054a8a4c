//! Package declarations and the merge engine that deduplicates them.
//!
//! ## Overview
//!
//! Every builder declares the packages it needs. Many builders ask for the
//! same package, sometimes with different options, so before a document is
//! rendered the declarations are folded into one [`Package`] per name by
//! [`cleanup`]. The fold keeps the position of the first declaration and
//! merges options according to a [`MergeMode`]:
//!
//! - [`MergeMode::Override`]: options of later declarations replace earlier
//!   values for the same key.
//! - [`MergeMode::FirstWins`]: existing keys are kept, missing keys are
//!   filled in from later declarations.
//!
//! Incompatibility registries are always unioned.
//!
//! ## Incompatibilities
//!
//! A declaration can record that it must not be combined with another
//! package, together with the requester that introduced the constraint.
//! [`check_incompatible`] scans a package list and reports each offending
//! pair as a warning. The check is directional: `a` declaring `b`
//! incompatible flags the pair `(a, b)` but says nothing about `b`'s own
//! registry.
//!
//! ## Examples
//!
//! ```
//! use texforge_core::package::{cleanup, MergeMode, Package};
//!
//! let packages = vec![
//!     Package::new("xcolor")?.with_option("table"),
//!     Package::new("amsmath")?,
//!     Package::new("xcolor")?.with_value("dvipsnames", ""),
//! ];
//!
//! let merged = cleanup(&packages, MergeMode::Override);
//! assert_eq!(merged.len(), 2);
//! assert_eq!(merged[0].name(), "xcolor");
//! assert_eq!(merged[0].options().len(), 2);
//! # Ok::<(), texforge_core::Error>(())
//! ```

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::options::Options;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Maps an incompatible package name to the requesters that declared the
/// incompatibility.
pub type Incompatibilities = BTreeMap<String, BTreeSet<String>>;

/// A named LaTeX package dependency (`\usepackage[options]{name}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    name: String,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    options: Options,
    #[serde(default, skip_serializing_if = "Incompatibilities::is_empty")]
    incompatible: Incompatibilities,
}

impl Package {
    /// Declares a package without options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `name` is blank.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::configuration("package name may not be blank"));
        }
        Ok(Self::named(name))
    }

    /// Declares a package whose name is known to be valid.
    pub(crate) fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Options::new(),
            incompatible: Incompatibilities::new(),
        }
    }

    /// Adds a flag option, e.g. `table` for `xcolor`.
    pub fn with_option(mut self, key: impl Into<String>) -> Self {
        self.options.insert(key.into(), String::new());
        self
    }

    /// Adds a `key=value` option.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options.extend(options);
        self
    }

    /// Records that `requester` needs this package and that it is (probably)
    /// incompatible with the package `other`.
    pub fn incompatible_with(mut self, other: impl Into<String>, requester: impl Into<String>) -> Self {
        self.incompatible
            .entry(other.into())
            .or_default()
            .insert(requester.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn incompatibilities(&self) -> &Incompatibilities {
        &self.incompatible
    }

    fn absorb(&mut self, other: &Package, mode: MergeMode) {
        for (key, value) in &other.options {
            match mode {
                MergeMode::Override => {
                    self.options.insert(key.clone(), value.clone());
                }
                MergeMode::FirstWins => {
                    self.options
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }
            }
        }
        for (package, requesters) in &other.incompatible {
            self.incompatible
                .entry(package.clone())
                .or_default()
                .extend(requesters.iter().cloned());
        }
    }
}

/// How conflicting option values are resolved by [`cleanup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Later declarations win.
    #[default]
    Override,
    /// The first declaration wins, later ones only fill in missing keys.
    FirstWins,
}

/// Folds the declarations into one package per name.
///
/// The result is ordered by first occurrence. Running `cleanup` on its own
/// output returns an equal list.
pub fn cleanup(packages: &[Package], mode: MergeMode) -> Vec<Package> {
    let mut merged: Vec<Package> = Vec::with_capacity(packages.len());
    merge_into(&mut merged, packages, mode);
    if merged.len() != packages.len() {
        debug!(
            "merged {} package declarations into {}",
            packages.len(),
            merged.len()
        );
    }
    merged
}

/// Merges `incoming` into the first declaration of the same name in
/// `target`, appending packages that `target` does not declare yet.
///
/// Later declarations already in `target` are left untouched, so a
/// following [`cleanup`] with [`MergeMode::Override`] still lets them win.
pub fn merge_into(target: &mut Vec<Package>, incoming: &[Package], mode: MergeMode) {
    for package in incoming {
        match target.iter_mut().find(|p| p.name == package.name) {
            Some(existing) => existing.absorb(package, mode),
            None => target.push(package.clone()),
        }
    }
}

/// Every `(a, b)` pair where `a` lists `b` as incompatible.
pub fn incompatible_pairs(packages: &[Package]) -> BTreeSet<(String, String)> {
    let mut pairs = BTreeSet::new();
    for package in packages {
        for other in packages {
            if package.incompatible.contains_key(&other.name) {
                pairs.insert((package.name.clone(), other.name.clone()));
            }
        }
    }
    pairs
}

/// Reports every pair `(a, b)` where `a` lists `b` as incompatible.
///
/// Returns `true` if at least one such pair was found. Each pair produces a
/// warning in `diagnostics`; rendering is not aborted.
pub fn check_incompatible(packages: &[Package], diagnostics: &mut Diagnostics) -> bool {
    report_incompatible(packages, &BTreeSet::new(), diagnostics)
}

/// Like [`check_incompatible`], but stays silent about the pairs in `known`.
pub fn report_incompatible(
    packages: &[Package],
    known: &BTreeSet<(String, String)>,
    diagnostics: &mut Diagnostics,
) -> bool {
    let mut found = false;
    for package in packages {
        for other in packages {
            let Some(requesters) = package.incompatible.get(&other.name) else {
                continue;
            };
            if known.contains(&(package.name.clone(), other.name.clone())) {
                continue;
            }
            let requesters = requesters.iter().cloned().collect::<Vec<_>>().join(", ");
            diagnostics.warning(format!(
                "probably incompatible packages: [{}] need the {} package, which is probably \
                 incompatible with the {} package used in the document",
                requesters, other.name, package.name
            ));
            found = true;
        }
    }
    found
}
