//! TikZ pictures assembled from free-form drawing statements.

use crate::error::Result;
use crate::markup::indent;
use crate::options::flags;
use crate::package::Package;
use crate::plot::Plot;
use crate::preamble::PreambleEntry;
use crate::texable::Texable;

/// The library families that can be loaded in the preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Library {
    Tikz,
    Pgf,
    Pgfplots,
    /// Graph drawing libraries, part of TikZ.
    Gd,
}

impl Library {
    /// The preamble command that imports libraries of this family.
    pub fn command(self) -> &'static str {
        match self {
            Library::Tikz => "\\usetikzlibrary",
            Library::Pgf => "\\usepgflibrary",
            Library::Pgfplots => "\\usepgfplotslibrary",
            Library::Gd => "\\usegdlibrary",
        }
    }

    /// The package that provides the import command.
    pub fn package(self) -> &'static str {
        match self {
            Library::Tikz | Library::Gd => "tikz",
            Library::Pgf => "pgf",
            Library::Pgfplots => "pgfplots",
        }
    }

    /// Order in which the families are imported at the top of the preamble.
    pub const PREAMBLE_ORDER: [Library; 4] =
        [Library::Gd, Library::Pgfplots, Library::Pgf, Library::Tikz];

    /// A mergeable import entry, e.g. `\usetikzlibrary{arrows,calc}`.
    pub fn entry<S: AsRef<str>>(self, libraries: &[S]) -> PreambleEntry {
        PreambleEntry::mergeable(self.command())
            .with_options(flags(libraries.iter().map(|l| l.as_ref().to_string())))
    }
}

/// Builder for a `tikzpicture`.
///
/// ```
/// use texforge_core::tikz::Drawing;
/// use texforge_core::Texable;
///
/// let drawing = Drawing::new()
///     .option("scale=2")
///     .node("a", Some("0,0"), "A", &["draw"])
///     .draw("(a) -- (1,1)", &["->", "thick"]);
///
/// let lines = drawing.lines()?;
/// assert_eq!(lines[5], "        \\node[draw] at (0,0) (a) {A};");
/// assert_eq!(lines[6], "        \\draw [->,thick] (a) -- (1,1);");
/// # Ok::<(), texforge_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    options: Vec<String>,
    lines: Vec<String>,
    filename: Option<String>,
    packages: Vec<Package>,
    preamble: Vec<PreambleEntry>,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawing {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            lines: Vec::new(),
            filename: None,
            packages: vec![Package::named("tikz"), Package::named("pgf")],
            preamble: Vec::new(),
        }
    }

    /// A drawing that only contains `plot`.
    pub fn of(plot: &Plot) -> Self {
        Self::new().plot(plot)
    }

    /// Embeds a pgfplots axis.
    pub fn plot(mut self, plot: &Plot) -> Self {
        self.packages.extend(plot.packages());
        self.preamble.extend(plot.preamble_entries());
        self.lines.extend(plot.axis_lines());
        self
    }

    /// Name of the externalized graphic, emitted as `\tikzsetnextfilename`.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn add(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn add_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Adds a picture-wide option. Duplicates are ignored.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        let option = option.into();
        if !self.options.contains(&option) {
            self.options.push(option);
        }
        self
    }

    /// `\node[options] at (at) (name) {label};`
    pub fn node(self, name: &str, at: Option<&str>, label: &str, options: &[&str]) -> Self {
        let at = match at {
            Some(at) if !at.trim().is_empty() => format!("at ({}) ", at),
            _ => String::new(),
        };
        let line = format!("\\node[{}] {}({}) {{{}}};", options.join(","), at, name, label);
        self.add(line)
    }

    pub fn draw(self, path: &str, options: &[&str]) -> Self {
        self.statement("draw", path, options)
    }

    pub fn path(self, path: &str, options: &[&str]) -> Self {
        self.statement("path", path, options)
    }

    pub fn fill(self, path: &str, options: &[&str]) -> Self {
        self.statement("fill", path, options)
    }

    pub fn filldraw(self, path: &str, options: &[&str]) -> Self {
        self.statement("filldraw", path, options)
    }

    fn statement(self, command: &str, path: &str, options: &[&str]) -> Self {
        let line = format!("\\{} [{}] {};", command, options.join(","), path);
        self.add(line)
    }

    pub fn libraries(mut self, family: Library, libraries: &[&str]) -> Self {
        self.preamble.push(family.entry(libraries));
        self
    }

    pub fn tikz_libraries(self, libraries: &[&str]) -> Self {
        self.libraries(Library::Tikz, libraries)
    }

    pub fn pgf_libraries(self, libraries: &[&str]) -> Self {
        self.libraries(Library::Pgf, libraries)
    }

    pub fn pgfplots_libraries(self, libraries: &[&str]) -> Self {
        self.libraries(Library::Pgfplots, libraries)
    }

    pub fn gd_libraries(self, libraries: &[&str]) -> Self {
        self.libraries(Library::Gd, libraries)
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    pub(crate) fn picture_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + self.options.len() + 6);
        if let Some(filename) = &self.filename {
            out.push(format!("{}\\tikzsetnextfilename{{{}}}", indent(1), filename));
        }
        out.push(format!("{}\\begin{{tikzpicture}}", indent(1)));
        out.push(format!("{}[", indent(2)));
        for option in &self.options {
            out.push(format!("{}{},", indent(3), option));
        }
        out.push(format!("{}]", indent(2)));
        out.push(String::new());
        for line in &self.lines {
            out.push(format!("{}{}", indent(2), line));
        }
        out.push(format!("{}\\end{{tikzpicture}}", indent(1)));
        out
    }
}

impl Texable for Drawing {
    fn packages(&self) -> Vec<Package> {
        self.packages.clone()
    }

    fn preamble_entries(&self) -> Vec<PreambleEntry> {
        self.preamble.clone()
    }

    fn lines(&self) -> Result<Vec<String>> {
        Ok(self.picture_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picture_layout() {
        let drawing = Drawing::new()
            .filename("circle")
            .option("scale=2")
            .option("scale=2")
            .fill("(0,0) circle (1)", &["red"]);
        assert_eq!(
            drawing.lines().unwrap(),
            vec![
                "    \\tikzsetnextfilename{circle}",
                "    \\begin{tikzpicture}",
                "        [",
                "            scale=2,",
                "        ]",
                "",
                "        \\fill [red] (0,0) circle (1);",
                "    \\end{tikzpicture}",
            ]
        );
    }

    #[test]
    fn test_statements() {
        let lines = Drawing::new()
            .node("n", None, "N", &[])
            .node("m", Some(" "), "M", &["circle", "draw"])
            .path("(0,0) -- (1,0)", &[])
            .filldraw("(0,0) rectangle (1,1)", &["blue"])
            .picture_lines();
        assert_eq!(lines[4], "        \\node[] (n) {N};");
        assert_eq!(lines[5], "        \\node[circle,draw] (m) {M};");
        assert_eq!(lines[6], "        \\path [] (0,0) -- (1,0);");
        assert_eq!(lines[7], "        \\filldraw [blue] (0,0) rectangle (1,1);");
    }

    #[test]
    fn test_library_entries_merge() {
        let drawing = Drawing::new()
            .tikz_libraries(&["calc"])
            .tikz_libraries(&["arrows.meta"])
            .gd_libraries(&["trees"]);
        let cleaned = crate::preamble::cleanup(&drawing.preamble_entries());
        let lines: Vec<_> = cleaned.iter().map(PreambleEntry::line).collect();
        assert_eq!(lines, vec!["\\usetikzlibrary{arrows.meta,calc}", "\\usegdlibrary{trees}"]);
    }

    #[test]
    fn test_embedded_plot_brings_packages() {
        let drawing = Drawing::of(&Plot::new().grid());
        assert!(drawing.packages().iter().any(|p| p.name() == "pgfplots"));
        assert!(drawing
            .preamble_entries()
            .iter()
            .any(|e| e.command() == "\\pgfplotsset"));
        assert!(drawing.picture_lines().contains(&"        \\begin{axis}".to_string()));
    }
}
