//! Floating figures holding a graphic, a drawing or a row of subfigures.

use crate::error::{Error, Result};
use crate::markup::indent;
use crate::package::Package;
use crate::preamble::PreambleEntry;
use crate::texable::Texable;
use crate::tikz::Drawing;

/// Label prefix for figures.
pub const LABEL_PREFIX: &str = "fig:";

const FIGURE_POSITIONS: [&str; 5] = ["!", "h", "t", "b", "p"];
const WRAPFIGURE_POSITIONS: [&str; 4] = ["r", "l", "i", "o"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FigureEnvironment {
    #[default]
    Figure,
    /// A figure with text flowing around it, from `wrapfig`.
    WrapFigure,
}

impl FigureEnvironment {
    fn accepts(self, position: &str) -> bool {
        match self {
            FigureEnvironment::Figure => FIGURE_POSITIONS.contains(&position),
            FigureEnvironment::WrapFigure => WRAPFIGURE_POSITIONS
                .iter()
                .any(|p| p.eq_ignore_ascii_case(position)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FigureContent {
    Graphics(String),
    Drawing(Drawing),
}

/// Builder for a `figure` or `wrapfigure`.
///
/// Width, height and scale of an included graphic are exclusive: setting the
/// width or the height clears the scale and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    environment: FigureEnvironment,
    content: FigureContent,
    width: Option<String>,
    height: Option<String>,
    scale: Option<String>,
    position: Option<String>,
    breadth: String,
    caption: String,
    short_caption: String,
    label: Option<String>,
    centering: bool,
    subfigures: Vec<Figure>,
    separators: Vec<String>,
    subfigure_widths: Vec<String>,
    packages: Vec<Package>,
    preamble: Vec<PreambleEntry>,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}

impl Figure {
    pub fn new() -> Self {
        Self {
            environment: FigureEnvironment::Figure,
            content: FigureContent::Graphics(String::new()),
            width: None,
            height: None,
            scale: None,
            position: None,
            breadth: String::new(),
            caption: String::new(),
            short_caption: String::new(),
            label: None,
            centering: true,
            subfigures: Vec::new(),
            separators: Vec::new(),
            subfigure_widths: Vec::new(),
            packages: vec![Package::named("caption")],
            preamble: Vec::new(),
        }
    }

    pub fn in_environment(environment: FigureEnvironment) -> Self {
        Self::new().environment(environment)
    }

    pub fn environment(mut self, environment: FigureEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Includes the graphic at `path` via `\includegraphics`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.content = FigureContent::Graphics(path.into());
        self
    }

    pub fn drawing(mut self, drawing: Drawing) -> Self {
        self.content = FigureContent::Drawing(drawing);
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self.scale = None;
        self
    }

    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self.scale = None;
        self
    }

    pub fn scale(mut self, scale: impl Into<String>) -> Self {
        self.scale = Some(scale.into());
        self.width = None;
        self.height = None;
        self
    }

    /// Sets the placement specifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the position is not valid for the
    /// current environment: one of `!`, `h`, `t`, `b`, `p` for figures and
    /// one of `r`, `l`, `i`, `o` (any case) for wrapfigures.
    pub fn position(mut self, position: &str) -> Result<Self> {
        if !self.environment.accepts(position) {
            return Err(Error::configuration(format!(
                "unknown position argument for {}: {}",
                self.environment_name(),
                position
            )));
        }
        self.position = Some(position.to_string());
        Ok(self)
    }

    /// Width of a wrapfigure or subfigure, e.g. `0.4\textwidth`.
    pub fn breadth(mut self, breadth: impl Into<String>) -> Self {
        self.breadth = breadth.into();
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn short_caption(mut self, short_caption: impl Into<String>) -> Self {
        self.short_caption = short_caption.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn centering(mut self, centering: bool) -> Self {
        self.centering = centering;
        self
    }

    /// Replaces the content by a row of subfigures. With a label `L` set, the
    /// subfigures are labelled `L-0`, `L-1`, ...
    pub fn subfigures(mut self, subfigures: Vec<Figure>) -> Self {
        self.subfigures = subfigures;
        self
    }

    /// Code placed between consecutive subfigures, e.g. `\hfill`. Either none
    /// or exactly one per gap must be given.
    pub fn separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Breadths assigned to subfigures that have none of their own.
    pub fn subfigure_widths<I, S>(mut self, widths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subfigure_widths = widths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    pub fn get_caption(&self) -> &str {
        &self.caption
    }

    pub fn get_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_centering(&self) -> bool {
        self.centering
    }

    /// The `\includegraphics` size argument, e.g. `[width=3cm,height=2cm]`.
    pub fn size(&self) -> String {
        let parts: Vec<String> = [("width", &self.width), ("height", &self.height), ("scale", &self.scale)]
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}={}", key, v)))
            .collect();
        if parts.is_empty() {
            String::new()
        } else {
            format!("[{}]", parts.join(","))
        }
    }

    fn environment_name(&self) -> &'static str {
        match self.environment {
            FigureEnvironment::Figure => "figure",
            FigureEnvironment::WrapFigure => "wrapfigure",
        }
    }

    fn render(&self, n: usize, subfigure: bool, label: Option<&str>) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let position = self
            .position
            .as_deref()
            .map(|p| format!("[{}]", p))
            .unwrap_or_default();

        let environment = if subfigure {
            FigureEnvironment::Figure
        } else {
            self.environment
        };
        let begin = match environment {
            FigureEnvironment::Figure if subfigure => {
                format!("\\begin{{subfigure}}{}{{{}}}%", position, self.breadth)
            }
            FigureEnvironment::Figure => format!("\\begin{{figure}}{}%", position),
            FigureEnvironment::WrapFigure => format!(
                "\\begin{{wrapfigure}}{{{}}}{{{}}}%",
                self.position.as_deref().unwrap_or_default(),
                self.breadth
            ),
        };
        out.push(format!("{}{}", indent(n), begin));

        if self.centering {
            out.push(format!("{}\\centering%", indent(n + 1)));
        }

        if !self.subfigures.is_empty() {
            if !self.separators.is_empty() && self.separators.len() != self.subfigures.len() - 1 {
                return Err(Error::usage(format!(
                    "{} subfigures need {} separators, got {}",
                    self.subfigures.len(),
                    self.subfigures.len() - 1,
                    self.separators.len()
                )));
            }
            for (i, sub) in self.subfigures.iter().enumerate() {
                let sub_label = label.map(|l| format!("{}-{}", l, i));
                let sub_label = sub_label.as_deref().or(sub.label.as_deref());
                let sub = match self.subfigure_widths.get(i) {
                    Some(width) if sub.breadth.is_empty() => {
                        sub.clone().breadth(width.clone()).render(n + 1, true, sub_label)?
                    }
                    _ => sub.render(n + 1, true, sub_label)?,
                };
                out.extend(sub);
                if let Some(separator) = self.separators.get(i) {
                    out.push(format!("{}{}%", indent(n + 1), separator));
                }
            }
        } else {
            match &self.content {
                FigureContent::Graphics(path) => out.push(format!(
                    "{}\\includegraphics{}{{{}}}%",
                    indent(n + 1),
                    self.size(),
                    path
                )),
                FigureContent::Drawing(drawing) => {
                    let base = indent(1);
                    for line in drawing.picture_lines() {
                        let line = line.strip_prefix(base.as_str()).unwrap_or(&line);
                        out.push(format!("{}{}%", indent(n + 1), line));
                    }
                }
            }
        }

        if !self.caption.is_empty() {
            let short = if self.short_caption.is_empty() {
                String::new()
            } else {
                format!("[{}]", self.short_caption)
            };
            out.push(format!(
                "{}\\caption{}{{{}}}%",
                indent(n + 1),
                short,
                self.caption
            ));
        }

        if let Some(label) = label {
            out.push(format!("{}\\label{{{}{}}}%", indent(n + 1), LABEL_PREFIX, label));
        }

        let end = match environment {
            FigureEnvironment::Figure if subfigure => "\\end{subfigure}%",
            FigureEnvironment::Figure => "\\end{figure}%",
            FigureEnvironment::WrapFigure => "\\end{wrapfigure}%",
        };
        out.push(format!("{}{}", indent(n), end));
        Ok(out)
    }
}

impl Figure {
    /// Packages of this figure. Nested figures render as `subfigure`, so
    /// they never need `wrapfig`.
    fn collect_packages(&self, nested: bool) -> Vec<Package> {
        let mut packages = self.packages.clone();
        if self.environment == FigureEnvironment::WrapFigure && !nested {
            packages.push(Package::named("wrapfig"));
        }
        if self.subfigures.is_empty() {
            match &self.content {
                FigureContent::Graphics(_) => packages.push(Package::named("graphicx")),
                FigureContent::Drawing(drawing) => packages.extend(drawing.packages()),
            }
        } else {
            packages.push(
                Package::named("subcaption")
                    .with_value("hypcap", "true")
                    .incompatible_with("subfig", "Figure"),
            );
            packages.push(Package::named("caption").with_value("hypcap", "true"));
            for sub in &self.subfigures {
                packages.extend(sub.collect_packages(true));
            }
        }
        packages
    }
}

impl Texable for Figure {
    fn packages(&self) -> Vec<Package> {
        self.collect_packages(false)
    }

    fn preamble_entries(&self) -> Vec<PreambleEntry> {
        let mut entries = self.preamble.clone();
        if self.subfigures.is_empty() {
            if let FigureContent::Drawing(drawing) = &self.content {
                entries.extend(drawing.preamble_entries());
            }
        } else {
            for sub in &self.subfigures {
                entries.extend(sub.preamble_entries());
            }
        }
        entries
    }

    fn lines(&self) -> Result<Vec<String>> {
        self.render(1, false, self.label.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{cleanup, MergeMode};

    #[test]
    fn test_size_exclusivity() {
        let figure = Figure::new().width("3cm").scale("0.5");
        assert_eq!(figure.size(), "[scale=0.5]");

        let figure = figure.width("3cm").height("2cm");
        assert_eq!(figure.size(), "[width=3cm,height=2cm]");

        assert_eq!(Figure::new().size(), "");
    }

    #[test]
    fn test_graphics_layout() {
        let figure = Figure::new()
            .path("img/plot.pdf")
            .width("0.8\\textwidth")
            .caption("A plot")
            .short_caption("Plot")
            .label("plot")
            .position("h")
            .unwrap();
        assert_eq!(
            figure.lines().unwrap(),
            vec![
                "    \\begin{figure}[h]%",
                "        \\centering%",
                "        \\includegraphics[width=0.8\\textwidth]{img/plot.pdf}%",
                "        \\caption[Plot]{A plot}%",
                "        \\label{fig:plot}%",
                "    \\end{figure}%",
            ]
        );
    }

    #[test]
    fn test_position_validation() {
        assert!(Figure::new().position("t").is_ok());
        assert!(matches!(
            Figure::new().position("r"),
            Err(Error::Configuration(_))
        ));

        let wrap = Figure::in_environment(FigureEnvironment::WrapFigure);
        assert!(wrap.clone().position("R").is_ok());
        assert!(matches!(wrap.position("h"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_wrapfigure() {
        let figure = Figure::in_environment(FigureEnvironment::WrapFigure)
            .position("r")
            .unwrap()
            .breadth("0.4\\textwidth")
            .centering(false)
            .path("a.png");
        let lines = figure.lines().unwrap();
        assert_eq!(lines[0], "    \\begin{wrapfigure}{r}{0.4\\textwidth}%");
        assert_eq!(lines.last().unwrap(), "    \\end{wrapfigure}%");
        assert!(figure.packages().iter().any(|p| p.name() == "wrapfig"));
    }

    #[test]
    fn test_subfigures() {
        let figure = Figure::new()
            .label("pair")
            .caption("Both")
            .subfigure_widths(["0.45\\textwidth"])
            .subfigures(vec![
                Figure::new().path("a.png").caption("A"),
                Figure::new().path("b.png").breadth("0.5\\textwidth").centering(false),
            ])
            .separators(["\\hfill"]);

        assert_eq!(
            figure.lines().unwrap(),
            vec![
                "    \\begin{figure}%",
                "        \\centering%",
                "        \\begin{subfigure}{0.45\\textwidth}%",
                "            \\centering%",
                "            \\includegraphics{a.png}%",
                "            \\caption{A}%",
                "            \\label{fig:pair-0}%",
                "        \\end{subfigure}%",
                "        \\hfill%",
                "        \\begin{subfigure}{0.5\\textwidth}%",
                "            \\includegraphics{b.png}%",
                "            \\label{fig:pair-1}%",
                "        \\end{subfigure}%",
                "        \\caption{Both}%",
                "        \\label{fig:pair}%",
                "    \\end{figure}%",
            ]
        );

        let packages = cleanup(&figure.packages(), MergeMode::Override);
        let subcaption = packages.iter().find(|p| p.name() == "subcaption").unwrap();
        assert_eq!(subcaption.options()["hypcap"], "true");
        assert!(subcaption.incompatibilities()["subfig"].contains("Figure"));
        let caption = packages.iter().find(|p| p.name() == "caption").unwrap();
        assert_eq!(caption.options()["hypcap"], "true");
    }

    #[test]
    fn test_nested_wrapfigure_needs_no_wrapfig() {
        let nested = Figure::in_environment(FigureEnvironment::WrapFigure)
            .breadth("0.4\\textwidth")
            .path("a.png");
        let figure = Figure::new().subfigures(vec![nested.clone(), Figure::new().path("b.png")]);

        assert!(figure.lines().unwrap().iter().all(|l| !l.contains("wrapfigure")));
        assert!(!figure.packages().iter().any(|p| p.name() == "wrapfig"));
        assert!(nested.packages().iter().any(|p| p.name() == "wrapfig"));

        let outer = Figure::in_environment(FigureEnvironment::WrapFigure)
            .subfigures(vec![Figure::new().path("c.png")]);
        assert!(outer.packages().iter().any(|p| p.name() == "wrapfig"));
    }

    #[test]
    fn test_separator_mismatch() {
        let figure = Figure::new()
            .subfigures(vec![Figure::new(), Figure::new(), Figure::new()])
            .separators(["\\hfill"]);
        assert!(matches!(figure.lines(), Err(Error::Usage(_))));

        let without = figure.separators(Vec::<String>::new());
        assert!(without.lines().is_ok());
    }

    #[test]
    fn test_drawing_content() {
        let drawing = Drawing::new().draw("(0,0) -- (1,1)", &[]).tikz_libraries(&["calc"]);
        let figure = Figure::new().drawing(drawing).centering(false);
        assert_eq!(
            figure.lines().unwrap(),
            vec![
                "    \\begin{figure}%",
                "        \\begin{tikzpicture}%",
                "            [%",
                "            ]%",
                "        %",
                "            \\draw [] (0,0) -- (1,1);%",
                "        \\end{tikzpicture}%",
                "    \\end{figure}%",
            ]
        );
        assert!(figure.packages().iter().any(|p| p.name() == "tikz"));
        assert!(!figure.packages().iter().any(|p| p.name() == "graphicx"));
        assert_eq!(figure.preamble_entries()[0].command(), "\\usetikzlibrary");
    }
}
