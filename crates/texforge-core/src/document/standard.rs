use super::Document;
use crate::options::{flags, options};
use crate::package::Package;
use crate::preamble::PreambleEntry;
use crate::settings::TexEngine;
use once_cell::sync::Lazy;

pub(super) static STANDARD: Lazy<Document> = Lazy::new(build);

const PRIMARY: &str = "red!31.372549019!black";
const SECONDARY: &str = "green!31.372549019!black";

fn build() -> Document {
    let mut doc = Document::new();
    doc.compiler(TexEngine::LuaLatex)
        .folder("LaTeX/")
        .repeat(3)
        .color_scheme(PRIMARY, SECONDARY)
        .left_footer(None, Some("\\pagemark"))
        .right_footer(Some("\\pagemark"), None)
        .left_header(None, Some("\\leftmark"))
        .right_header(Some("\\rightmark"), None);

    let mut class_options = flags(["a4paper", "headinclude", "english", "oneside", "12pt"]);
    class_options.extend(options([
        ("DIV", "calc"),
        ("BCOR", "8mm"),
        ("bibliography", "totoc"),
        ("listof", "totoc"),
        ("index", "totoc"),
        ("version", "last"),
        ("captions", "tableheading"),
    ]));
    doc.documentclass_with_options("scrartcl", class_options);

    doc.use_packages([
        "csquotes",
        "babel",
        "amsmath",
        "fontspec",
        "unicode-math",
        "microtype",
        "selnolig",
        "siunitx",
        "booktabs",
        "xcolor",
        "colortbl",
        "hyperref",
        "cleveref",
        "bookmark",
        "scrlayer-scrpage",
    ]);

    let packages = [
        Package::named("unicode-math")
            .with_value("math-style", "ISO")
            .with_value("bold-style", "ISO")
            .with_value("nabla", "upright"),
        Package::named("amsmath").with_option("fleqn"),
        Package::named("csquotes")
            .with_value("strict", "true")
            .with_value("autostyle", "true"),
        Package::named("babel").with_value("main", "english"),
        Package::named("xcolor").with_option("table"),
        Package::named("cleveref").with_option("noabbrev"),
        Package::named("caption")
            .with_value("format", "plain")
            .with_value("indention", "1em")
            .with_value("labelfont", format!("{{color={},small,sf,bf}}", PRIMARY))
            .with_value("textfont", "{color={black},small}")
            .with_value("width", "0.925\\textwidth"),
        Package::named("microtype")
            .with_value("activate", "{true,nocompatibility}")
            .with_option("final")
            .with_value("tracking", "true")
            .with_value("factor", "1100")
            .with_value("stretch", "10")
            .with_option("shrink"),
        Package::named("siunitx")
            .with_value("locale", "UK")
            .with_option("separate-uncertainty")
            .with_value("per-mode", "symbol-or-fraction"),
        Package::named("hyperref")
            .with_value("pdfpagemode", "UseOutlines")
            .with_value("pdfencoding", "unicode")
            .with_value("bookmarksopenlevel", "0"),
        Package::named("bookmark").with_option("open"),
        Package::named("scrlayer-scrpage").with_option("automark"),
    ];
    for package in packages {
        doc.use_package(package);
    }

    for line in [
        "\\setmainfont{Latin Modern Roman}",
        "\\setcounter{totalnumber}{4}",
        "\\setcounter{topnumber}{2}",
        "\\setcounter{bottomnumber}{2}",
        "\\setcounter{dbltopnumber}{2}",
        "\\renewcommand{\\topfraction}{0.9}",
        "\\renewcommand{\\bottomfraction}{0.5}",
        "\\renewcommand{\\floatpagefraction}{0.8}",
        "\\renewcommand{\\textfraction}{0.1}",
        "\\renewcommand{\\dbltopfraction}{0.9}",
        "\\renewcommand{\\dblfloatpagefraction}{0.8}",
    ] {
        doc.add_line_to_preamble(line);
    }

    doc.add_to_preamble(
        PreambleEntry::new("\\AtBeginEnvironment{tabular}").with_option("\\addfontfeatures{Numbers={Monospaced}}"),
    )
    .add_line_to_preamble("\\SetTracking{encoding={*}, shape=sc}{40}")
    .add_to_preamble(
        PreambleEntry::new("\\DisableLigatures[ff,ffi,fj,fi]")
            .with_value("encoding", "*")
            .with_value("family", "sc*"),
    )
    .add_to_preamble(
        PreambleEntry::new("\\bookmarksetup")
            .with_value("addtohook", "{\\ifnum\\bookmarkget{level}<1 \\bookmarksetup{bold}\\fi}"),
    );

    // Will Robertson's guard against line breaks before citations.
    doc.add_line_to_preamble(
        "\\def\\nobreakbefore{\\relax\\ifvmode\\else\\ifhmode\\ifdim\\lastskip > 0pt\\relax\\unskip\\nobreakspace\\fi\\fi\\fi}",
    )
    .add_line_to_preamble("\\let\\oldcite\\cite")
    .add_line_to_preamble("\\renewcommand\\cite{\\nobreakbefore\\oldcite}");

    doc
}
