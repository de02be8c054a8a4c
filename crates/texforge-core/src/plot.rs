//! pgfplots axes with formula, coordinate and contour series.
//!
//! A [`Plot`] renders a bare `axis` environment. It is usually wrapped in a
//! [`Drawing`](crate::tikz::Drawing), either explicitly or through
//! [`Document::plot_data`](crate::document::Document::plot_data).

use crate::document::Document;
use crate::error::{Error, Result};
use crate::markup::indent;
use crate::options::{join_options, to_options, Options};
use crate::package::Package;
use crate::preamble::PreambleEntry;
use crate::settings::TexEngine;
use crate::texable::Texable;
use crate::tikz::{Drawing, Library};
use log::debug;
use std::collections::BTreeSet;
use std::path::Path;

/// Data accepted by [`Plot::plot`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlotInput {
    /// A formula such as `x^2`, or the path of an existing data file.
    Expression(String),
    /// Two rows (`x`, `y`) or three rows (`x`, `y`, `z`) of coordinates.
    Rows(Vec<Vec<f64>>),
}

impl From<&str> for PlotInput {
    fn from(value: &str) -> Self {
        PlotInput::Expression(value.to_string())
    }
}

impl From<String> for PlotInput {
    fn from(value: String) -> Self {
        PlotInput::Expression(value)
    }
}

impl From<Vec<Vec<f64>>> for PlotInput {
    fn from(value: Vec<Vec<f64>>) -> Self {
        PlotInput::Rows(value)
    }
}

impl<const N: usize> From<[Vec<f64>; N]> for PlotInput {
    fn from(value: [Vec<f64>; N]) -> Self {
        PlotInput::Rows(value.into())
    }
}

/// Builder for a pgfplots `axis`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    options: Options,
    lines: Vec<String>,
    packages: Vec<Package>,
    preamble: Vec<PreambleEntry>,
    estimated_rows: usize,
}

impl Default for Plot {
    fn default() -> Self {
        Self::new()
    }
}

impl Plot {
    /// An empty axis with `compat=newest`.
    pub fn new() -> Self {
        Self {
            options: Options::new(),
            lines: Vec::new(),
            packages: vec![Package::named("pgfplots")],
            preamble: Vec::new(),
            estimated_rows: 0,
        }
        .compat("newest")
    }

    /// A new axis holding a single series.
    pub fn of(input: impl Into<PlotInput>, legend: Option<&str>, options: &Options) -> Result<Self> {
        Self::new().plot(input, legend, options)
    }

    /// A new axis holding a single contour series.
    pub fn contour_of(x: &[f64], y: &[f64], z: &[Vec<f64>], options: &Options) -> Result<Self> {
        Self::new().contour(x, y, z, options)
    }

    pub fn add(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options.extend(options);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn grid(self) -> Self {
        self.option("grid", "major")
    }

    pub fn xlabel(self, label: &str) -> Self {
        self.option("xlabel", label)
    }

    pub fn ylabel(self, label: &str) -> Self {
        self.option("ylabel", label)
    }

    /// Label of the colorbar.
    pub fn clabel(self, label: &str) -> Self {
        self.option("colorbar style", format!("{{ylabel={{{}}}}}", label))
    }

    pub fn title(self, title: &str) -> Self {
        self.option("title", format!("{{{}}}", title))
    }

    /// Sets `\pgfplotsset{compat=...}`.
    pub fn compat(mut self, version: &str) -> Self {
        self.preamble
            .push(PreambleEntry::mergeable("\\pgfplotsset").with_value("compat", version));
        self
    }

    pub fn libraries(mut self, family: Library, libraries: &[&str]) -> Self {
        self.preamble.push(family.entry(libraries));
        self
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    /// Number of distinct x values of the last 3-D coordinate series.
    pub fn estimated_rows(&self) -> usize {
        self.estimated_rows
    }

    /// Adds a series.
    ///
    /// A string is plotted from file if a file of that name exists at call
    /// time, otherwise it is treated as a formula. Row data must consist of
    /// two or three rows of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] for any other number of rows, or for rows of
    /// different lengths.
    pub fn plot(
        mut self,
        input: impl Into<PlotInput>,
        legend: Option<&str>,
        options: &Options,
    ) -> Result<Self> {
        let options = if options.is_empty() {
            String::new()
        } else {
            format!("+{} ", to_options(options))
        };

        match input.into() {
            PlotInput::Expression(expression) => {
                let source = if Path::new(&expression).is_file() {
                    "file "
                } else {
                    ""
                };
                self.lines
                    .push(format!("\\addplot {}{}{{{}}};", options, source, expression));
            }
            PlotInput::Rows(rows) => {
                if rows.len() != 2 && rows.len() != 3 {
                    return Err(Error::usage("only 2D and 3D arrays are supported"));
                }
                let len = rows[0].len();
                if rows.iter().any(|r| r.len() != len) {
                    return Err(Error::usage("all coordinate rows must have the same length"));
                }
                let command = if rows.len() == 2 { "\\addplot" } else { "\\addplot3" };
                self.lines
                    .push(format!("{} {}coordinates {{", command, options));
                for i in 0..len {
                    let point = rows
                        .iter()
                        .map(|r| r[i].to_string())
                        .collect::<Vec<_>>()
                        .join(",");
                    self.lines.push(format!("{}({})", indent(1), point));
                }
                self.lines.push("};".to_string());
                if rows.len() == 3 {
                    let distinct: BTreeSet<u64> = rows[0].iter().map(|x| x.to_bits()).collect();
                    self.estimated_rows = distinct.len();
                    debug!("estimated {} mesh rows", self.estimated_rows);
                }
            }
        }

        if let Some(legend) = legend {
            self.lines.push(format!("\\addlegendentry{{{}}};", legend));
        }
        Ok(self)
    }

    /// Adds a filled contour plot of `z[i][j]` over the grid `x[i]`, `y[j]`.
    ///
    /// `contour filled={number=7}`, `samples=150` and `shader=interp` are
    /// added unless `options` already configure them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] if `z` is not `x.len()` by `y.len()`.
    pub fn contour(mut self, x: &[f64], y: &[f64], z: &[Vec<f64>], options: &Options) -> Result<Self> {
        if z.len() != x.len() || z.iter().any(|row| row.len() != y.len()) {
            return Err(Error::usage(format!(
                "contour data must be {}x{}",
                x.len(),
                y.len()
            )));
        }

        self.options.insert("view".into(), "{0}{90}".into());
        self.options.insert("colorbar".into(), String::new());

        let has_number = options
            .get("contour filled")
            .is_some_and(|v| v.contains("{number="));
        let mut header = format!("\\addplot3[surf,mesh/rows={},mesh/cols={},", x.len(), y.len());
        let user = join_options(options);
        if !user.is_empty() {
            header.push_str(&user);
            header.push(',');
        }
        if !has_number {
            header.push_str("contour filled={number=7},");
        }
        if !options.contains_key("samples") {
            header.push_str("samples=150,");
        }
        if !options.contains_key("shader") {
            header.push_str("shader=interp,");
        }
        header.push_str("] table {");

        self.lines.push(header);
        self.lines.push(format!("{}X Y Z", indent(1)));
        for (i, xi) in x.iter().enumerate() {
            for (j, yj) in y.iter().enumerate() {
                self.lines
                    .push(format!("{}{} {} {}", indent(1), xi, yj, z[i][j]));
            }
        }
        self.lines.push("};".to_string());
        Ok(self)
    }

    /// The `axis` environment, unindented.
    pub fn axis_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + self.options.len() + 5);
        out.push("\\begin{axis}".to_string());
        out.push(format!("{}[", indent(1)));
        for (key, value) in &self.options {
            if value.trim().is_empty() {
                out.push(format!("{}{},", indent(2), key));
            } else {
                out.push(format!("{}{}={},", indent(2), key, value));
            }
        }
        out.push(format!("{}]", indent(1)));
        out.push(String::new());
        for line in &self.lines {
            out.push(format!("{}{}", indent(1), line));
        }
        out.push("\\end{axis}".to_string());
        out
    }

    /// A `standalone` document rendering only this plot, styled with the
    /// Dark2 cycle list and the viridis colormap.
    pub fn standalone_document(&self) -> Result<Document> {
        let mut plot = self
            .clone()
            .libraries(Library::Pgfplots, &["colormaps", "colorbrewer"])
            .option("axis on top", "")
            .option("axis background/.style", "{fill=white}")
            .option("samples", "100")
            .option("legend cell align", "left");
        if self.estimated_rows != 0 {
            plot = plot.option("mesh/cols", self.estimated_rows.to_string());
        }
        plot.preamble
            .push(PreambleEntry::new("\\pgfplotsset").with_option("cycle list/Dark2-8"));
        plot.preamble.push(
            PreambleEntry::new("\\pgfplotsset")
                .with_value("cycle multiindex* list", "{mark list*\\nextlist Dark2-8\\nextlist}")
                .with_option("colormap/viridis"),
        );

        let mut document = Document::new();
        document
            .compiler(TexEngine::LuaLatex)
            .repeat(1)
            .clean(true, &[])
            .documentclass_with_options("standalone", crate::options::flags(["tikz"]))
            .add(&Drawing::of(&plot))?;
        Ok(document)
    }
}

impl Texable for Plot {
    fn packages(&self) -> Vec<Package> {
        self.packages.clone()
    }

    fn preamble_entries(&self) -> Vec<PreambleEntry> {
        self.preamble.clone()
    }

    fn lines(&self) -> Result<Vec<String>> {
        Ok(self.axis_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::options;
    use expect_test::expect;

    #[test]
    fn test_formula_series() {
        let plot = Plot::new()
            .grid()
            .xlabel("$x$")
            .plot("x^2", Some("square"), &options([("red", ""), ("mark", "none")]))
            .unwrap();
        let actual = plot.axis_lines().join("\n") + "\n";
        expect![[r#"
            \begin{axis}
                [
                    grid=major,
                    xlabel=$x$,
                ]

                \addplot +[mark=none,red] {x^2};
                \addlegendentry{square};
            \end{axis}
        "#]]
        .assert_eq(&actual);
    }

    #[test]
    fn test_file_series() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        std::fs::write(&data, "x y\n1 2\n").unwrap();
        let path = data.to_string_lossy().to_string();

        let plot = Plot::of(path.as_str(), None, &Options::new()).unwrap();
        let lines = plot.axis_lines();
        assert_eq!(lines[4], format!("    \\addplot file {{{}}};", path));
    }

    #[test]
    fn test_coordinates_2d() {
        let plot = Plot::of([vec![1.0, 2.0], vec![3.5, 4.0]], None, &Options::new()).unwrap();
        let lines = plot.axis_lines();
        assert_eq!(lines[4], "    \\addplot coordinates {");
        assert_eq!(lines[5], "        (1,3.5)");
        assert_eq!(lines[6], "        (2,4)");
        assert_eq!(lines[7], "    };");
        assert_eq!(plot.estimated_rows(), 0);
    }

    #[test]
    fn test_coordinates_3d_estimates_rows() {
        let plot = Plot::of(
            [vec![0.0, 0.0, 1.0, 1.0], vec![0.0, 1.0, 0.0, 1.0], vec![1.0, 2.0, 3.0, 4.0]],
            None,
            &Options::new(),
        )
        .unwrap();
        assert_eq!(plot.axis_lines()[4], "    \\addplot3 coordinates {");
        assert_eq!(plot.axis_lines()[5], "        (0,0,1)");
        assert_eq!(plot.estimated_rows(), 2);
    }

    #[test]
    fn test_unsupported_shapes() {
        let one = Plot::of(vec![vec![1.0]], None, &Options::new());
        assert!(matches!(one, Err(Error::Usage(_))));
        let four = Plot::of(vec![vec![1.0]; 4], None, &Options::new());
        assert!(matches!(four, Err(Error::Usage(_))));
        let ragged = Plot::of([vec![1.0, 2.0], vec![1.0]], None, &Options::new());
        assert!(matches!(ragged, Err(Error::Usage(_))));
    }

    #[test]
    fn test_contour_defaults() {
        let z = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let plot = Plot::contour_of(&[0.0, 1.0], &[5.0, 6.0], &z, &Options::new()).unwrap();
        let lines = plot.axis_lines();
        assert!(lines.contains(&"        colorbar,".to_string()));
        assert!(lines.contains(&"        view={0}{90},".to_string()));
        assert!(lines.contains(&
            "    \\addplot3[surf,mesh/rows=2,mesh/cols=2,contour filled={number=7},samples=150,shader=interp,] table {"
                .to_string()
        ));
        assert!(lines.contains(&"        0 6 2".to_string()));
        assert!(lines.contains(&"        1 5 3".to_string()));
    }

    #[test]
    fn test_contour_respects_user_options() {
        let z = vec![vec![1.0]];
        let user = options([("contour filled", "{number=3}"), ("samples", "10")]);
        let plot = Plot::contour_of(&[0.0], &[0.0], &z, &user).unwrap();
        let header = plot
            .axis_lines()
            .into_iter()
            .find(|l| l.contains("\\addplot3"))
            .unwrap();
        assert_eq!(
            header,
            "    \\addplot3[surf,mesh/rows=1,mesh/cols=1,contour filled={number=3},samples=10,shader=interp,] table {"
        );
    }

    #[test]
    fn test_contour_shape_mismatch() {
        let z = vec![vec![1.0, 2.0]];
        assert!(matches!(
            Plot::contour_of(&[0.0, 1.0], &[0.0, 1.0], &z, &Options::new()),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn test_helpers_and_compat() {
        let plot = Plot::new().clabel("T").title("Heat").ylabel("y").compat("1.18");
        let lines = plot.axis_lines();
        assert!(lines.contains(&"        colorbar style={ylabel={T}},".to_string()));
        assert!(lines.contains(&"        title={Heat},".to_string()));
        let merged = crate::preamble::cleanup(&plot.preamble_entries());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].line(), "\\pgfplotsset{compat=1.18}");
    }

    #[test]
    fn test_standalone_document() {
        let plot = Plot::of(
            [vec![0.0, 0.0, 1.0], vec![0.0, 1.0, 0.0], vec![1.0, 2.0, 3.0]],
            Some("z"),
            &Options::new(),
        )
        .unwrap();
        let source = plot.standalone_document().unwrap().render().source;
        assert!(source.contains("\\documentclass[tikz]{standalone}"));
        assert!(source.contains("\\usepgfplotslibrary{colorbrewer,colormaps}"));
        assert!(source.contains("mesh/cols=2,"));
        assert!(source.contains("\\pgfplotsset{cycle list/Dark2-8}"));
        assert!(source.contains("% !TEX program = lualatex"));
    }
}
