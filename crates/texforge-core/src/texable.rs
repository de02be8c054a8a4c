//! The seam between content builders and the [`Document`](crate::document::Document).

use crate::error::Result;
use crate::package::Package;
use crate::preamble::PreambleEntry;

/// Anything that can be placed in a document body.
///
/// A builder reports the packages and preamble entries it relies on next to
/// its serialized lines. The document merges those into its registries when
/// the builder is added, so the builder never has to know which other
/// content shares the document.
pub trait Texable {
    /// Packages required by the rendered lines.
    fn packages(&self) -> Vec<Package>;

    /// Preamble commands required by the rendered lines.
    fn preamble_entries(&self) -> Vec<PreambleEntry> {
        Vec::new()
    }

    /// The body lines, already indented for the document body.
    ///
    /// # Errors
    ///
    /// Fails if the builder was configured in a way that can only be detected
    /// once everything is known, e.g. a table using more columns than its
    /// format defines.
    fn lines(&self) -> Result<Vec<String>>;
}
