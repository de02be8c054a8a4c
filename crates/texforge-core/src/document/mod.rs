//! The document aggregator.
//!
//! ## Overview
//!
//! A [`Document`] collects the output of [`Texable`] builders together with
//! its own package declarations, preamble entries and settings, and renders
//! the complete LaTeX source in one pass (see [`Document::render`]).
//!
//! Unlike the element builders, which consume and return `self`, a document
//! is configured through `&mut self` so that it can be filled incrementally
//! from loops:
//!
//! ```
//! use texforge_core::document::Document;
//! use texforge_core::equation::Equation;
//!
//! let mut doc = Document::new();
//! doc.documentclass("scrartcl").section("Results", Some("results"));
//! for i in 0..2 {
//!     doc.add(&Equation::new().line(format!("x_{} = {}", i, i), true))?;
//! }
//! let rendered = doc.render();
//! assert!(rendered.source.contains("\\section{Results}\\label{sec:results}"));
//! assert!(rendered.source.contains("\\usepackage{amsmath}"));
//! # Ok::<(), texforge_core::Error>(())
//! ```
//!
//! ## Merging
//!
//! Packages contributed by builders are merged first-wins: a package that is
//! already declared keeps its options and only gains missing ones. Packages
//! declared directly through [`Document::use_package`] are appended as is
//! and override earlier options when the document is rendered.

mod render;
mod standard;

pub use render::Rendered;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::figure::Figure;
use crate::markup::{indent, SECTION_LABEL_PREFIX};
use crate::options::Options;
use crate::package::{
    check_incompatible, cleanup, incompatible_pairs, merge_into, report_incompatible, MergeMode, Package,
};
use crate::plot::{Plot, PlotInput};
use crate::preamble::{self, PreambleEntry};
use crate::settings::{Clean, ColorScheme, PageSlots, Settings, Slot, TexEngine};
use crate::texable::Texable;
use crate::tikz::{Drawing, Library};
use crate::equation::Equation;
use log::{debug, warn};

const BIBURL_PENALTIES: [&str; 3] = [
    "\\setcounter{biburllcpenalty}{7000}",
    "\\setcounter{biburlucpenalty}{7000}",
    "\\setcounter{biburlnumpenalty}{7000}",
];

const DEFAULT_CLASS: &str = "scrartcl";

/// A LaTeX document under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    settings: Settings,
    documentclass: Option<String>,
    class_options: Options,
    required: Vec<Package>,
    packages: Vec<Package>,
    preamble: Vec<PreambleEntry>,
    body: Vec<String>,
    open_environments: Vec<String>,
    diagnostics: Diagnostics,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty `scrartcl` document.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            documentclass: None,
            class_options: Options::new(),
            required: Vec::new(),
            packages: Vec::new(),
            preamble: Vec::new(),
            body: Vec::new(),
            open_environments: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// A KOMA-Script article preset for LuaLaTeX with a curated package set,
    /// float placement tuning and page numbers in the foot.
    pub fn standard() -> Self {
        standard::STANDARD.clone()
    }

    // ----- settings -----

    pub fn compiler(&mut self, compiler: TexEngine) -> &mut Self {
        self.settings.compiler = Some(compiler);
        self
    }

    /// Output folder. Backslashes are normalized and a trailing `/` added.
    pub fn folder(&mut self, folder: &str) -> &mut Self {
        self.settings.folder = Some(normalize_folder(folder));
        self
    }

    pub fn filename(&mut self, filename: impl Into<String>) -> &mut Self {
        self.settings.filename = Some(filename.into());
        self
    }

    /// Number of engine passes when compiling.
    pub fn repeat(&mut self, repeat: u32) -> &mut Self {
        self.settings.repeat = Some(repeat);
        self
    }

    /// Enables removal of helper files after compiling. `extra` extensions
    /// are added to `aux`, `bbl` and `log`.
    pub fn clean(&mut self, clean: bool, extra: &[&str]) -> &mut Self {
        self.settings.clean = Some(Clean::new(clean, extra));
        self
    }

    pub fn color_scheme(&mut self, primary: &str, secondary: &str) -> &mut Self {
        self.settings.color_scheme = Some(ColorScheme::colors(primary, secondary));
        self
    }

    pub fn no_color_scheme(&mut self) -> &mut Self {
        self.settings.color_scheme = Some(ColorScheme::Off);
        self
    }

    pub fn left_header(&mut self, odd: Option<&str>, even: Option<&str>) -> &mut Self {
        self.header_mut().left = Slot::new(odd, even);
        self.use_packages(["scrlayer-scrpage"])
    }

    pub fn center_header(&mut self, odd: Option<&str>, even: Option<&str>) -> &mut Self {
        self.header_mut().center = Slot::new(odd, even);
        self.use_packages(["scrlayer-scrpage"])
    }

    pub fn right_header(&mut self, odd: Option<&str>, even: Option<&str>) -> &mut Self {
        self.header_mut().right = Slot::new(odd, even);
        self.use_packages(["scrlayer-scrpage"])
    }

    pub fn left_footer(&mut self, odd: Option<&str>, even: Option<&str>) -> &mut Self {
        self.footer_mut().left = Slot::new(odd, even);
        self.use_packages(["scrlayer-scrpage"])
    }

    pub fn center_footer(&mut self, odd: Option<&str>, even: Option<&str>) -> &mut Self {
        self.footer_mut().center = Slot::new(odd, even);
        self.use_packages(["scrlayer-scrpage"])
    }

    pub fn right_footer(&mut self, odd: Option<&str>, even: Option<&str>) -> &mut Self {
        self.footer_mut().right = Slot::new(odd, even);
        self.use_packages(["scrlayer-scrpage"])
    }

    fn header_mut(&mut self) -> &mut PageSlots {
        self.settings.header.get_or_insert_with(PageSlots::default)
    }

    fn footer_mut(&mut self) -> &mut PageSlots {
        self.settings.footer.get_or_insert_with(PageSlots::default)
    }

    // ----- title page -----

    pub fn maketitle(&mut self, maketitle: bool) -> &mut Self {
        self.settings.title_page.maketitle = Some(maketitle);
        self
    }

    pub fn titlehead(&mut self, titlehead: &str) -> &mut Self {
        self.settings.title_page.titlehead = Some(titlehead.to_string());
        self.maketitle(true)
    }

    /// Sets the subject, also used as PDF metadata.
    pub fn subject(&mut self, subject: &str) -> &mut Self {
        self.use_package(Package::named("hyperref").with_value("pdfsubject", format!("{{{}}}", subject)));
        self.settings.title_page.subject = Some(subject.to_string());
        self.maketitle(true)
    }

    /// Sets the title, also used as PDF metadata.
    pub fn title(&mut self, title: &str) -> &mut Self {
        self.use_package(Package::named("hyperref").with_value("pdftitle", format!("{{{}}}", title)));
        self.settings.title_page.title = Some(title.to_string());
        self.maketitle(true)
    }

    pub fn subtitle(&mut self, subtitle: &str) -> &mut Self {
        self.settings.title_page.subtitle = Some(subtitle.to_string());
        self.maketitle(true)
    }

    /// Sets the authors, joined by `\and`. The PDF metadata lists them
    /// comma separated, without `\thanks` footnotes.
    pub fn authors(&mut self, authors: &[&str]) -> &mut Self {
        let author = authors.join("\\and ");
        let pdf = strip_thanks(&author.replace("\\and ", ",").replace("\\and", ","));
        self.use_package(Package::named("hyperref").with_value("pdfauthor", format!("{{{}}}", pdf)));
        self.settings.title_page.author = Some(author);
        self.maketitle(true)
    }

    pub fn date(&mut self, date: &str) -> &mut Self {
        self.settings.title_page.date = Some(date.to_string());
        self.maketitle(true)
    }

    pub fn publisher(&mut self, publisher: &str) -> &mut Self {
        self.settings.title_page.publisher = Some(publisher.to_string());
        self.maketitle(true)
    }

    pub fn extratitle(&mut self, extratitle: &str) -> &mut Self {
        self.settings.title_page.extratitle = Some(extratitle.to_string());
        self.maketitle(true)
    }

    pub fn uppertitleback(&mut self, text: &str) -> &mut Self {
        self.settings.title_page.uppertitleback = Some(text.to_string());
        self.maketitle(true)
    }

    pub fn lowertitleback(&mut self, text: &str) -> &mut Self {
        self.settings.title_page.lowertitleback = Some(text.to_string());
        self.maketitle(true)
    }

    pub fn dedication(&mut self, dedication: &str) -> &mut Self {
        self.settings.title_page.dedication = Some(dedication.to_string());
        self.maketitle(true)
    }

    // ----- class, packages and preamble -----

    pub fn documentclass(&mut self, documentclass: &str) -> &mut Self {
        self.documentclass = Some(documentclass.to_string());
        self
    }

    /// Sets the class and adds `options` to the class options.
    pub fn documentclass_with_options(&mut self, documentclass: &str, options: Options) -> &mut Self {
        self.class_options.extend(options);
        self.documentclass(documentclass)
    }

    /// Declares packages without options. Blank names are skipped.
    pub fn use_packages<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if name.trim().is_empty() {
                warn!("ignoring package declaration without a name");
                continue;
            }
            self.packages.push(Package::named(name));
        }
        self
    }

    /// Appends a package declaration. Its options override earlier ones of
    /// the same package.
    pub fn use_package(&mut self, package: Package) -> &mut Self {
        self.packages.push(package);
        self
    }

    pub fn use_package_with_options(&mut self, name: &str, options: Options) -> &mut Self {
        self.use_package(Package::named(name).with_options(options))
    }

    pub fn remove_packages(&mut self, names: &[&str]) -> &mut Self {
        self.packages.retain(|p| !names.contains(&p.name()));
        self
    }

    /// Loads `package` via `\RequirePackage` ahead of `\documentclass`.
    pub fn require_package(&mut self, package: Package) -> &mut Self {
        self.required.push(package);
        self
    }

    pub fn add_to_preamble(&mut self, entry: PreambleEntry) -> &mut Self {
        self.preamble.push(entry);
        self
    }

    /// Adds a standalone preamble line.
    pub fn add_line_to_preamble(&mut self, line: &str) -> &mut Self {
        self.add_to_preamble(PreambleEntry::new(line))
    }

    /// Removes all preamble entries with the given command.
    pub fn remove_from_preamble(&mut self, command: &str) -> &mut Self {
        self.preamble.retain(|e| e.command() != command);
        self
    }

    pub fn tikz_libraries(&mut self, libraries: &[&str]) -> &mut Self {
        self.libraries(Library::Tikz, libraries)
    }

    pub fn pgf_libraries(&mut self, libraries: &[&str]) -> &mut Self {
        self.libraries(Library::Pgf, libraries)
    }

    pub fn pgfplots_libraries(&mut self, libraries: &[&str]) -> &mut Self {
        self.libraries(Library::Pgfplots, libraries)
    }

    pub fn gd_libraries(&mut self, libraries: &[&str]) -> &mut Self {
        self.libraries(Library::Gd, libraries)
    }

    fn libraries(&mut self, family: Library, libraries: &[&str]) -> &mut Self {
        if libraries.is_empty() {
            return self;
        }
        self.use_packages([family.package()]);
        self.add_to_preamble(family.entry(libraries))
    }

    /// Externalizes TikZ pictures into `folder`, relative to the output
    /// folder unless absolute. Only the preamble is configured; the folder
    /// must exist when compiling.
    pub fn externalize(&mut self, folder: &str) -> &mut Self {
        self.use_packages(["tikz", "shellesc"]);
        self.tikz_libraries(&["external"]);
        let prefix = if folder.trim().is_empty() {
            String::new()
        } else {
            format!("prefix={}", normalize_folder(folder))
        };
        let output = self.settings.folder.clone().unwrap_or_default();
        let engine = self.settings.compiler_or_default();
        self.add_line_to_preamble(&format!("\\tikzexternalize[{}]", prefix));
        self.add_line_to_preamble(&format!(
            "\\tikzset{{external/system call={{{} --output-directory={} \\tikzexternalcheckshellescape \
             --enable-write18 -halt-on-error -interaction=batchmode -jobname \"\\image\" \"\\texsource\"}}}}",
            engine, output
        ))
    }

    /// Enables or disables biblatex with a biber backend.
    pub fn bibliography(&mut self, bibliography: bool) -> &mut Self {
        if bibliography {
            self.use_packages(["biblatex"]);
            self.use_package(
                Package::named("biblatex")
                    .with_value("backend", "biber")
                    .with_value("hyperref", "true")
                    .with_value("language", "english")
                    .with_value("style", "numeric-comp")
                    .with_value("maxbibnames", "5")
                    .with_value("sortlocale", "en"),
            );
            for penalty in BIBURL_PENALTIES {
                if !self.has_preamble_entry(penalty) {
                    self.add_line_to_preamble(penalty);
                }
            }
        } else {
            self.remove_packages(&["biblatex"]);
            for penalty in BIBURL_PENALTIES {
                self.remove_from_preamble(penalty);
            }
        }
        self.settings.bibliography = Some(bibliography);
        self
    }

    /// Uses `bibfile.bib` as bibliography resource and enables biblatex.
    pub fn bibfile(&mut self, bibfile: &str) -> &mut Self {
        self.settings.bibfile = Some(bibfile.trim_end_matches(".bib").to_string());
        self.bibliography(true)
    }

    // ----- body -----

    /// Appends a raw line to the body.
    pub fn line(&mut self, code: &str) -> &mut Self {
        self.body.push(format!("{}{}", indent(1), code));
        self
    }

    /// Opens an environment. Environments still open at render time are
    /// reported as diagnostics.
    pub fn begin_env(&mut self, environment: &str) -> &mut Self {
        self.open_environments.push(environment.to_string());
        self.line(&format!("\\begin{{{}}}%", environment))
    }

    pub fn end_env(&mut self, environment: &str) -> &mut Self {
        match self.open_environments.iter().rposition(|e| e == environment) {
            Some(i) => {
                self.open_environments.remove(i);
            }
            None => self.diagnostics.warning(format!(
                "closed environment {} that was not opened with begin_env",
                environment
            )),
        }
        self.line(&format!("\\end{{{}}}%", environment))
    }

    pub fn chapter(&mut self, title: &str, label: Option<&str>) -> &mut Self {
        self.heading("chapter", title, label)
    }

    pub fn section(&mut self, title: &str, label: Option<&str>) -> &mut Self {
        self.heading("section", title, label)
    }

    pub fn subsection(&mut self, title: &str, label: Option<&str>) -> &mut Self {
        self.heading("subsection", title, label)
    }

    pub fn subsubsection(&mut self, title: &str, label: Option<&str>) -> &mut Self {
        self.heading("subsubsection", title, label)
    }

    fn heading(&mut self, command: &str, title: &str, label: Option<&str>) -> &mut Self {
        let label = match label {
            Some(l) if !l.trim().is_empty() => format!("\\label{{{}{}}}", SECTION_LABEL_PREFIX, l),
            _ => String::new(),
        };
        self.line(&format!("\\{}{{{}}}{}", command, title, label))
    }

    pub fn toc(&mut self) -> &mut Self {
        self.without_protrusion("\\tableofcontents")
    }

    pub fn lof(&mut self) -> &mut Self {
        self.without_protrusion("\\listoffigures")
    }

    pub fn lot(&mut self) -> &mut Self {
        self.without_protrusion("\\listoftables")
    }

    fn without_protrusion(&mut self, code: &str) -> &mut Self {
        if self.has_package("microtype") {
            self.line(&format!("{{\\microtypesetup{{protrusion=false}}{}}}", code))
        } else {
            self.line(code)
        }
    }

    pub fn print_bibliography(&mut self) -> &mut Self {
        self.line("\\printbibliography")
    }

    /// Appends the lines of `texable` to the body and merges its packages
    /// and preamble entries.
    ///
    /// A package already declared keeps its options and only gains missing
    /// ones. Incompatible pairs introduced by the call are reported as
    /// diagnostics, they do not fail it.
    pub fn add(&mut self, texable: &impl Texable) -> Result<&mut Self> {
        let lines = texable.lines()?;
        let known = incompatible_pairs(&self.loaded_packages());

        self.body.extend(lines);
        merge_into(&mut self.packages, &texable.packages(), MergeMode::FirstWins);
        self.preamble.extend(texable.preamble_entries());
        self.preamble = preamble::cleanup(&self.preamble);

        report_incompatible(&self.loaded_packages(), &known, &mut self.diagnostics);
        Ok(self)
    }

    /// A single `equation` whose lines each end with `\\`.
    pub fn equation(&mut self, lines: &[&str]) -> Result<&mut Self> {
        self.add(&Equation::new().add_lines(lines.iter().copied()))
    }

    pub fn labeled_equation(&mut self, label: &str, lines: &[&str]) -> Result<&mut Self> {
        self.add(&Equation::new().add_lines(lines.iter().copied()).label(label))
    }

    /// A centered figure including the graphic at `path`.
    pub fn add_figure(
        &mut self,
        path: &str,
        width: Option<&str>,
        caption: &str,
        label: Option<&str>,
    ) -> Result<&mut Self> {
        let mut figure = Figure::new().path(path).caption(caption);
        if let Some(width) = width {
            figure = figure.width(width);
        }
        if let Some(label) = label {
            figure = figure.label(label);
        }
        self.add(&figure)
    }

    /// A centered figure holding a single plotted series.
    pub fn plot_data(
        &mut self,
        caption: &str,
        data: impl Into<PlotInput>,
        legend: Option<&str>,
        options: &Options,
    ) -> Result<&mut Self> {
        let plot = Plot::of(data, legend, options)?;
        self.add_plot(&plot, caption)
    }

    pub fn add_plot(&mut self, plot: &Plot, caption: &str) -> Result<&mut Self> {
        self.add(&Figure::new().caption(caption).drawing(Drawing::of(plot)))
    }

    /// Takes over everything explicitly configured on `other`.
    ///
    /// Settings are only copied when `other` set them. Packages, class
    /// options, preamble entries and body lines are appended.
    pub fn merge(&mut self, other: &Document) -> &mut Self {
        self.settings = std::mem::take(&mut self.settings).prefer(other.settings.clone());
        if let Some(class) = &other.documentclass {
            self.documentclass = Some(class.clone());
        }
        self.class_options.extend(other.class_options.clone());
        self.required.extend(other.required.iter().cloned());
        self.packages.extend(other.packages.iter().cloned());
        self.preamble.extend(preamble::cleanup(&other.preamble));
        self.body.extend(other.body.iter().cloned());
        self.open_environments.extend(other.open_environments.iter().cloned());
        self.diagnostics.extend(other.diagnostics.clone());

        self.required = cleanup(&self.required, MergeMode::Override);
        self.packages = cleanup(&self.packages, MergeMode::Override);
        self.preamble = preamble::cleanup(&self.preamble);
        debug!("merged document, {} body lines", self.body.len());
        self
    }

    // ----- accessors -----

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces all settings.
    pub fn set_settings(&mut self, settings: Settings) -> &mut Self {
        self.settings = settings;
        self
    }

    pub fn get_documentclass(&self) -> &str {
        self.documentclass.as_deref().unwrap_or(DEFAULT_CLASS)
    }

    pub fn class_options(&self) -> &Options {
        &self.class_options
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn required_packages(&self) -> &[Package] {
        &self.required
    }

    pub fn preamble(&self) -> &[PreambleEntry] {
        &self.preamble
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// Diagnostics collected while the document was assembled.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn has_package(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p.name() == name)
    }

    fn has_preamble_entry(&self, command: &str) -> bool {
        self.preamble.iter().any(|e| e.command() == command)
    }

    /// Checks all declared and required packages for declared
    /// incompatibilities, reporting each into `diagnostics`.
    pub fn check_packages(&self, diagnostics: &mut Diagnostics) -> bool {
        check_incompatible(&self.loaded_packages(), diagnostics)
    }

    fn loaded_packages(&self) -> Vec<Package> {
        let mut loaded = cleanup(&self.packages, MergeMode::Override);
        loaded.extend(cleanup(&self.required, MergeMode::Override));
        loaded
    }
}

fn normalize_folder(folder: &str) -> String {
    let mut folder = folder.replace('\\', "/");
    if !folder.is_empty() && !folder.ends_with('/') {
        folder.push('/');
    }
    folder
}

/// Removes `\thanks{...}` groups, honouring nested braces.
fn strip_thanks(text: &str) -> String {
    const THANKS: &str = "\\thanks{";
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(THANKS) {
        out.push_str(&rest[..start]);
        let after = &rest[start + THANKS.len()..];
        let mut depth = 1;
        let mut end = after.len();
        for (i, c) in after.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        rest = &after[end..];
    }
    out.push_str(rest);
    out
}
