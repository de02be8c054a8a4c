use super::Document;
use crate::diagnostics::Diagnostics;
use crate::markup::indent;
use crate::options::to_options;
use crate::package::{cleanup, MergeMode, Package};
use crate::preamble::{self, PreambleEntry, EMPTY_LINE, MAJOR_SEPARATOR};
use crate::settings::ColorScheme;
use crate::tikz::Library;
use std::fmt;

const KOMA_CLASSES: [&str; 3] = ["scrbook", "scrreprt", "scrartcl"];
const STANDARD_CLASSES: [&str; 4] = ["article", "book", "report", "letter"];

/// The rendered source together with the findings made while rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub source: String,
    pub diagnostics: Diagnostics,
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render().source)
    }
}

fn block(title: &str, lines: &[String]) -> String {
    let mut out = format!("{0}\n% {1}\n{0}\n", MAJOR_SEPARATOR, title);
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(MAJOR_SEPARATOR);
    out.push_str("\n\n");
    out
}

fn import(command: &str, package: &Package) -> String {
    let options = if package.options().is_empty() {
        String::new()
    } else {
        to_options(package.options())
    };
    format!("{}{}{{{}}}", command, options, package.name())
}

impl Document {
    /// Renders the complete LaTeX source.
    ///
    /// The document itself is not modified: packages and preamble entries
    /// are deduplicated on a copy, and generated preamble content (the
    /// bibliography resource, library imports, header and footer, colour
    /// scheme) is placed ahead of the user's entries.
    pub fn render(&self) -> Rendered {
        let mut diagnostics = self.diagnostics.clone();
        let class = self.get_documentclass();
        let mut packages = self.packages.clone();
        let mut maketitle = self.settings.title_page.maketitle.unwrap_or(false);

        if !self.open_environments.is_empty() {
            diagnostics.warning(format!(
                "environments opened with begin_env but never closed: {}",
                self.open_environments.join(", ")
            ));
        }

        if !KOMA_CLASSES.contains(&class) {
            if STANDARD_CLASSES.contains(&class) {
                packages.push(Package::named("scrextend").with_value("extendedfeature", "title"));
            } else if maketitle {
                diagnostics.info(format!("class {} has no KOMA title page, skipping it", class));
                maketitle = false;
            }
        }

        let packages = cleanup(&packages, MergeMode::Override);
        let required = cleanup(&self.required, MergeMode::Override);
        let has_package = |name: &str| packages.iter().any(|p| p.name() == name);
        let colors = self.settings.color_scheme_or_default();
        let engine = self.settings.compiler_or_default();
        let bibliography = self.settings.bibliography.unwrap_or(false);

        let mut out = String::new();
        out.push_str(&format!("% !TEX program = {}\n", engine));
        if bibliography {
            out.push_str("% !BIB program = biber\n");
        }
        out.push_str("% !TEX encoding = UTF-8 Unicode\n\n");

        if !required.is_empty() {
            let lines: Vec<String> = required.iter().map(|p| import("\\RequirePackage", p)).collect();
            out.push_str(&block("Required packages", &lines));
        }

        let class_options = if self.class_options.is_empty() {
            String::new()
        } else {
            to_options(&self.class_options)
        };
        out.push_str(&format!("\\documentclass{}{{{}}}\n\n", class_options, class));

        if !packages.is_empty() {
            let lines: Vec<String> = packages.iter().map(|p| import("\\usepackage", p)).collect();
            out.push_str(&block("packages", &lines));
        }

        let generated = self.generated_preamble(&has_package);
        if !generated.is_empty() || !self.preamble.is_empty() {
            let mut entries = generated;
            entries.extend(self.preamble.iter().cloned());
            let lines: Vec<String> = preamble::cleanup(&entries)
                .iter()
                .map(PreambleEntry::line)
                .collect();
            out.push_str(&block("settings/user defs", &lines));
        }

        if maketitle {
            out.push_str(&self.title_block(&colors));
        }

        out.push_str("\\begin{document}\n");
        if maketitle {
            if has_package("scrlayer-scrpage") {
                out.push_str(&format!("{}\\pagestyle{{empty}}\n", indent(1)));
                out.push_str(&format!("{}\\maketitle[-1]\n", indent(1)));
                out.push_str(&format!("{}\\pagestyle{{scrheadings}}\n\n", indent(1)));
            } else {
                out.push_str(&format!("{}\\maketitle\n\n", indent(1)));
            }
        }
        out.push_str(&self.body.join("\n"));
        out.push('\n');
        out.push_str("\\end{document}\n");

        Rendered {
            source: out,
            diagnostics,
        }
    }

    fn generated_preamble(&self, has_package: &dyn Fn(&str) -> bool) -> Vec<PreambleEntry> {
        let mut entries = Vec::new();

        if let Some(bibfile) = &self.settings.bibfile {
            if has_package("biblatex") {
                entries.push(
                    PreambleEntry::mergeable("\\addbibresource").with_option(format!("{}.bib", bibfile)),
                );
                entries.push(PreambleEntry::new(EMPTY_LINE));
            }
        }

        let mut libraries = false;
        for family in Library::PREAMBLE_ORDER {
            let used = self
                .preamble
                .iter()
                .any(|e| !e.is_standalone() && e.command() == family.command());
            if used {
                entries.push(PreambleEntry::mergeable(family.command()));
                libraries = true;
            }
        }
        if libraries {
            entries.push(PreambleEntry::new(EMPTY_LINE));
        }

        if has_package("scrlayer-scrpage") {
            for (slots, part, clear) in [
                (&self.settings.header, "head", "\\clearpairofpagestyles"),
                (&self.settings.footer, "foot", "\\clearmainofpairofpagestyles"),
            ] {
                let Some(slots) = slots.as_ref().filter(|s| !s.is_empty()) else {
                    continue;
                };
                entries.push(PreambleEntry::new(clear));
                for (command, content) in slots.assignments(part) {
                    entries.push(PreambleEntry::mergeable(command).with_option(content));
                }
                entries.push(PreambleEntry::new(EMPTY_LINE));
            }
        }

        // Only an explicitly chosen scheme styles captions and headings.
        if let Some(ColorScheme::Colors { primary, secondary }) = &self.settings.color_scheme {
            let label_font = format!("{{color={{{}}}}}", primary);
            if has_package("caption") {
                entries.push(PreambleEntry::mergeable("\\captionsetup").with_value("labelfont+", &label_font));
            }
            if has_package("subcaption") {
                entries.push(
                    PreambleEntry::mergeable("\\captionsetup[sub]").with_value("labelfont+", &label_font),
                );
            }
            if has_package("caption") || has_package("subcaption") {
                entries.push(PreambleEntry::new(EMPTY_LINE));
            }

            let class = self.get_documentclass();
            if KOMA_CLASSES.contains(&class) {
                let font = |element: &str, color: &str| {
                    PreambleEntry::mergeable(format!("\\addtokomafont{{{}}}", element))
                        .with_option(format!("\\color{{{}}}", color))
                };
                entries.push(font("pagehead", primary));
                entries.push(font("footnoterule", secondary));
                entries.push(font("pagenumber", secondary));
                if class == "scrbook" {
                    entries.push(font("part", primary));
                }
                if class == "scrbook" || class == "scrreprt" {
                    entries.push(font("chapter", primary));
                }
                for element in ["section", "subsection", "subsubsection"] {
                    entries.push(font(element, primary));
                }
                entries.push(PreambleEntry::new(EMPTY_LINE));
            }
        }

        entries
    }

    fn title_block(&self, colors: &ColorScheme) -> String {
        let page = &self.settings.title_page;
        let colored = |text: &str| match colors {
            ColorScheme::Colors { primary, .. } => format!("\\color{{{}}}{}", primary, text),
            ColorScheme::Off => text.to_string(),
        };
        let fields = [
            ("titlehead", page.titlehead.clone()),
            ("subject", page.subject.clone()),
            ("title", page.title.as_deref().map(colored)),
            ("subtitle", page.subtitle.as_deref().map(colored)),
            ("author", page.author.clone()),
            ("date", page.date.clone()),
            ("publishers", page.publisher.clone()),
            ("extratitle", page.extratitle.clone()),
            ("uppertitleback", page.uppertitleback.clone()),
            ("lowertitleback", page.lowertitleback.clone()),
            ("dedication", page.dedication.clone()),
        ];
        let lines: Vec<String> = fields
            .into_iter()
            .filter_map(|(command, value)| value.map(|v| format!("\\{}{{{}}}", command, v)))
            .collect();
        block("titlepage", &lines)
    }
}
