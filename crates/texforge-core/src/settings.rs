//! Document settings that remember whether they were explicitly set.
//!
//! Every field of [`Settings`] is optional. `None` means "not set here", so
//! that merging two documents only transfers what the caller configured on
//! the incoming one (see [`Settings::prefer`]). Defaults are applied when the
//! document is rendered or compiled, through the `*_or_default` accessors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Helper files removed after compiling when cleaning is enabled.
pub const DEFAULT_CLEAN_EXTENSIONS: [&str; 3] = ["aux", "bbl", "log"];

/// Passes run by default, enough for references and a bibliography.
pub const DEFAULT_REPEAT: u32 = 3;

/// The TeX engine a document is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TexEngine {
    Latex,
    PdfLatex,
    XeTex,
    #[default]
    LuaLatex,
}

impl TexEngine {
    pub const ALL: [TexEngine; 4] = [
        TexEngine::Latex,
        TexEngine::PdfLatex,
        TexEngine::XeTex,
        TexEngine::LuaLatex,
    ];

    /// Name of the executable, also used in the `% !TEX program` comment.
    pub fn executable(self) -> &'static str {
        match self {
            TexEngine::Latex => "latex",
            TexEngine::PdfLatex => "pdflatex",
            TexEngine::XeTex => "xetex",
            TexEngine::LuaLatex => "lualatex",
        }
    }

    /// Parses an executable name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|engine| engine.executable().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for TexEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

/// Removal of helper files after compiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clean {
    pub enabled: bool,
    pub extensions: BTreeSet<String>,
}

impl Clean {
    /// The default extensions plus `extra`. Leading dots are dropped.
    pub fn new(enabled: bool, extra: &[&str]) -> Self {
        let extensions = DEFAULT_CLEAN_EXTENSIONS
            .iter()
            .chain(extra)
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { enabled, extensions }
    }
}

/// Colours used for captions, headings and the page head/foot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Off,
    Colors { primary: String, secondary: String },
}

impl ColorScheme {
    pub fn colors(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        ColorScheme::Colors {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::colors("black", "black")
    }
}

/// Content of one page head or foot position on odd and even pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slot {
    pub odd: Option<String>,
    pub even: Option<String>,
}

impl Slot {
    pub fn new(odd: Option<&str>, even: Option<&str>) -> Self {
        Self {
            odd: odd.map(str::to_string),
            even: even.map(str::to_string),
        }
    }
}

/// The six positions of a page head or foot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSlots {
    pub left: Slot,
    pub center: Slot,
    pub right: Slot,
}

impl PageSlots {
    pub fn is_empty(&self) -> bool {
        self.assignments("").next().is_none()
    }

    /// `(command, content)` pairs in the order `le, lo, ce, co, re, ro`,
    /// with `part` being `head` or `foot`.
    pub fn assignments<'a>(&'a self, part: &'a str) -> impl Iterator<Item = (String, &'a str)> + 'a {
        [("l", &self.left), ("c", &self.center), ("r", &self.right)]
            .into_iter()
            .flat_map(move |(side, slot)| {
                [("e", &slot.even), ("o", &slot.odd)]
                    .into_iter()
                    .filter_map(move |(parity, content)| {
                        content
                            .as_deref()
                            .map(|c| (format!("\\{}{}{}", side, parity, part), c))
                    })
            })
    }
}

/// Fields of the KOMA-Script title page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlePage {
    pub maketitle: Option<bool>,
    pub titlehead: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    pub extratitle: Option<String>,
    pub uppertitleback: Option<String>,
    pub lowertitleback: Option<String>,
    pub dedication: Option<String>,
}

impl TitlePage {
    fn prefer(self, other: TitlePage) -> TitlePage {
        TitlePage {
            maketitle: other.maketitle.or(self.maketitle),
            titlehead: other.titlehead.or(self.titlehead),
            subject: other.subject.or(self.subject),
            title: other.title.or(self.title),
            subtitle: other.subtitle.or(self.subtitle),
            author: other.author.or(self.author),
            date: other.date.or(self.date),
            publisher: other.publisher.or(self.publisher),
            extratitle: other.extratitle.or(self.extratitle),
            uppertitleback: other.uppertitleback.or(self.uppertitleback),
            lowertitleback: other.lowertitleback.or(self.lowertitleback),
            dedication: other.dedication.or(self.dedication),
        }
    }
}

/// Explicitly configured document settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub compiler: Option<TexEngine>,
    pub folder: Option<String>,
    pub filename: Option<String>,
    pub repeat: Option<u32>,
    pub clean: Option<Clean>,
    pub color_scheme: Option<ColorScheme>,
    pub header: Option<PageSlots>,
    pub footer: Option<PageSlots>,
    pub title_page: TitlePage,
    pub bibliography: Option<bool>,
    pub bibfile: Option<String>,
}

impl Settings {
    /// Combines two settings, taking every value that is set in `other` and
    /// falling back to `self` otherwise.
    pub fn prefer(self, other: Settings) -> Settings {
        Settings {
            compiler: other.compiler.or(self.compiler),
            folder: other.folder.or(self.folder),
            filename: other.filename.or(self.filename),
            repeat: other.repeat.or(self.repeat),
            clean: other.clean.or(self.clean),
            color_scheme: other.color_scheme.or(self.color_scheme),
            header: other.header.or(self.header),
            footer: other.footer.or(self.footer),
            title_page: self.title_page.prefer(other.title_page),
            bibliography: other.bibliography.or(self.bibliography),
            bibfile: other.bibfile.or(self.bibfile),
        }
    }

    pub fn compiler_or_default(&self) -> TexEngine {
        self.compiler.unwrap_or_default()
    }

    pub fn repeat_or_default(&self) -> u32 {
        self.repeat.unwrap_or(DEFAULT_REPEAT)
    }

    pub fn color_scheme_or_default(&self) -> ColorScheme {
        self.color_scheme.clone().unwrap_or_default()
    }

    /// Extensions to remove after compiling, empty when cleaning is off.
    pub fn clean_extensions(&self) -> BTreeSet<String> {
        match &self.clean {
            Some(clean) if clean.enabled => clean.extensions.clone(),
            _ => BTreeSet::new(),
        }
    }
}
