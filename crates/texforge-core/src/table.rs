//! Booktabs tables built from a sparse grid of cells.
//!
//! Cells are addressed by `(column, row)` and may be set in any order. The
//! extent of the table is derived from the highest addressed cell when the
//! table is rendered. Cell texts containing `\multirow{K}` or
//! `\multicolumn{K}` also claim the cells they span, so the grid stays
//! rectangular without the caller filling placeholders by hand.
//!
//! ```
//! use texforge_core::table::{multicolumn, Table};
//! use texforge_core::Texable;
//!
//! let table = Table::new()
//!     .format(["l", "r", "r"])
//!     .row(0, ["", "2023", "2024"])
//!     .entry(0, 1, &multicolumn(3, "c", "no data"))
//!     .midrule(0)
//!     .caption("Revenue")
//!     .label("revenue");
//!
//! let lines = table.lines()?;
//! assert_eq!(lines[0], "    \\begin{table}[]%");
//! assert!(lines.iter().any(|l| l.contains("\\label{tab:revenue}")));
//! # Ok::<(), texforge_core::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::markup::indent;
use crate::package::Package;
use crate::texable::Texable;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};

/// Label prefix for tables.
pub const LABEL_PREFIX: &str = "tab:";

/// Largest `K` accepted in a `\multirow{K}` or `\multicolumn{K}` marker.
pub const MAX_SPAN: usize = 1024;

const POSITIONS: [&str; 5] = ["!", "h", "t", "b", "p"];
const CELLCOLOR_WRAPPER_LEN: usize = "{\\cellcolor{}}".len();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableEnvironment {
    #[default]
    Tabular,
    Longtable,
}

impl TableEnvironment {
    pub fn name(self) -> &'static str {
        match self {
            TableEnvironment::Tabular => "tabular",
            TableEnvironment::Longtable => "longtable",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Cell {
    text: Option<String>,
    color: Option<String>,
    /// Explicit separator decision made by a span marker.
    separator: Option<bool>,
}

impl Cell {
    fn width(&self) -> usize {
        let text = self.text.as_deref().map_or(0, |t| t.chars().count());
        let color = self
            .color
            .as_deref()
            .map_or(0, |c| CELLCOLOR_WRAPPER_LEN + c.chars().count());
        text + color
    }
}

/// Builder for `tabular` and `longtable` content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    format: String,
    defined_columns: usize,
    environment: TableEnvironment,
    cells: BTreeMap<(usize, usize), Cell>,
    midrules: BTreeSet<usize>,
    end_head: Option<usize>,
    caption: Option<String>,
    short_caption: Option<String>,
    label: Option<String>,
    centering: bool,
    floating: bool,
    position: Option<String>,
    packages: Vec<Package>,
    /// First cell whose span marker could not be activated.
    invalid_span: Option<String>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// A centered, floating `tabular` without columns.
    pub fn new() -> Self {
        Self {
            format: String::new(),
            defined_columns: 0,
            environment: TableEnvironment::Tabular,
            cells: BTreeMap::new(),
            midrules: BTreeSet::new(),
            end_head: None,
            caption: None,
            short_caption: None,
            label: None,
            centering: true,
            floating: true,
            position: None,
            packages: vec![
                Package::named("booktabs"),
                Package::named("longtable"),
                Package::named("caption"),
                Package::named("multirow"),
                Package::named("xcolor").with_option("table"),
            ],
            invalid_span: None,
        }
    }

    /// Sets one column specification per column, e.g. `["l", "S", "p{3cm}"]`.
    pub fn format<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let specs: Vec<String> = specs
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();
        self.defined_columns = specs.len();
        self.format = specs.join(" ");
        self
    }

    pub fn environment(mut self, environment: TableEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn get_environment(&self) -> TableEnvironment {
        self.environment
    }

    pub fn entry(mut self, col: usize, row: usize, text: &str) -> Self {
        self.cells.entry((col, row)).or_default().text = Some(text.to_string());
        self.activate(col, row, text);
        self
    }

    /// Colors the background of a cell via `\cellcolor`.
    pub fn color(mut self, col: usize, row: usize, color: &str) -> Self {
        self.cells.entry((col, row)).or_default().color = Some(color.to_string());
        self.activate(col, row, color);
        self
    }

    /// Sets consecutive cells of `row`, starting at column 0.
    pub fn row<I, S>(mut self, row: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (col, text) in cells.into_iter().enumerate() {
            self = self.entry(col, row, text.as_ref());
        }
        self
    }

    /// Sets consecutive cells of `col`, starting at row 0.
    pub fn column<I, S>(self, col: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.column_from(col, 0, cells)
    }

    /// Sets consecutive cells of `col`, starting at `row`.
    pub fn column_from<I, S>(mut self, col: usize, row: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, text) in cells.into_iter().enumerate() {
            self = self.entry(col, row + i, text.as_ref());
        }
        self
    }

    /// Adds a `\midrule` after `row`.
    pub fn midrule(mut self, row: usize) -> Self {
        self.midrules.insert(row);
        self
    }

    /// Marks `row` as the last row of the repeated head of a `longtable`.
    pub fn end_head(mut self, row: usize) -> Self {
        self.end_head = Some(row);
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Caption used in the list of tables.
    pub fn short_caption(mut self, caption: impl Into<String>) -> Self {
        self.short_caption = Some(caption.into());
        self
    }

    /// Label, only emitted for floating tables.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn centering(mut self, centering: bool) -> Self {
        self.centering = centering;
        self
    }

    pub fn floating(mut self, floating: bool) -> Self {
        self.floating = floating;
        self
    }

    /// Sets the float placement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for anything but `!`, `h`, `t`, `b`
    /// or `p`.
    pub fn position(mut self, position: &str) -> Result<Self> {
        if !POSITIONS.contains(&position) {
            return Err(Error::configuration(format!(
                "unknown table position '{}'",
                position
            )));
        }
        self.position = Some(position.to_string());
        Ok(self)
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub fn is_centering(&self) -> bool {
        self.centering
    }

    pub fn get_caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn get_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn activate(&mut self, col: usize, row: usize, text: &str) {
        if let Some(rows) = span_count(text, "\\multirow{") {
            match row.checked_add(rows) {
                Some(end) if rows <= MAX_SPAN => {
                    for r in row.saturating_add(1)..end {
                        self.cells.entry((col, r)).or_default();
                    }
                }
                _ => self.reject_span(text),
            }
        }
        if let Some(cols) = span_count(text, "\\multicolumn{") {
            match col.checked_add(cols) {
                Some(end) if cols <= MAX_SPAN => {
                    if cols > 1 {
                        for c in col..end - 1 {
                            self.cells.entry((c, row)).or_default().separator = Some(false);
                        }
                        self.cells.entry((end - 1, row)).or_default();
                    }
                }
                _ => self.reject_span(text),
            }
        }
    }

    fn reject_span(&mut self, text: &str) {
        warn!("span in table cell is too large: {}", text);
        self.invalid_span.get_or_insert_with(|| text.to_string());
    }

    /// `(columns, rows)` spanned by the active cells.
    fn extent(&self) -> Result<(usize, usize)> {
        if let Some(text) = &self.invalid_span {
            return Err(Error::usage(format!(
                "a table cell may span at most {} cells: {}",
                MAX_SPAN, text
            )));
        }
        if self.cells.is_empty() {
            return Ok((0, 0));
        }
        let columns = self.cells.keys().map(|(c, _)| c + 1).max().unwrap_or(0);
        let rows = self.cells.keys().map(|(_, r)| r + 1).max().unwrap_or(0);
        if columns > self.defined_columns {
            return Err(Error::configuration(format!(
                "more columns requested than defined: {} > {}",
                columns, self.defined_columns
            )));
        }
        Ok((columns, rows))
    }

    fn render_rows(&self, columns: usize, rows: usize, level: usize) -> Vec<String> {
        let empty = Cell::default();
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                self.cells
                    .range((c, 0)..=(c, usize::MAX))
                    .map(|(_, cell)| cell.width())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut line = indent(level);
            for (col, width) in widths.iter().enumerate() {
                let cell = self.cells.get(&(col, row)).unwrap_or(&empty);
                if let Some(color) = &cell.color {
                    line.push_str(&format!("{{\\cellcolor{{{}}}}}", color));
                }
                if let Some(text) = &cell.text {
                    line.push_str(text);
                }
                line.push_str(&" ".repeat(width - cell.width()));
                if cell.separator.unwrap_or(col + 1 != columns) {
                    line.push_str(" & ");
                }
            }
            line.push_str(" \\tabularnewline");
            if self.midrules.contains(&row) {
                line.push_str("\\midrule");
            }
            if self.end_head == Some(row) && self.environment == TableEnvironment::Longtable {
                line.push_str("\\endhead");
            }
            if row + 1 == rows {
                line.push_str("\\bottomrule");
            }
            out.push(line);
        }
        out
    }
}

/// Parses the span count `K` of a `\multirow{K}` or `\multicolumn{K}` marker.
fn span_count(text: &str, marker: &str) -> Option<usize> {
    let start = text.find(marker)? + marker.len();
    let end = text[start..].find('}')? + start;
    match text[start..end].trim().parse() {
        Ok(count) => Some(count),
        Err(_) => {
            warn!("ignoring malformed span in table cell: {}", text);
            None
        }
    }
}

/// `\multirow{rows}{*}{content}`.
pub fn multirow(rows: usize, content: &str) -> String {
    multirow_with_width(rows, "*", content)
}

pub fn multirow_with_width(rows: usize, width: &str, content: &str) -> String {
    format!("\\multirow{{{}}}{{{}}}{{{}}}", rows, width, content)
}

/// `\multicolumn{columns}{alignment}{content}`.
pub fn multicolumn(columns: usize, alignment: &str, content: &str) -> String {
    format!("\\multicolumn{{{}}}{{{}}}{{{}}}", columns, alignment, content)
}

impl Texable for Table {
    fn packages(&self) -> Vec<Package> {
        self.packages.clone()
    }

    fn lines(&self) -> Result<Vec<String>> {
        let (columns, rows) = self.extent()?;
        let env = self.environment.name();
        let mut out = Vec::new();
        let mut n = 1;

        if self.floating {
            out.push(format!(
                "{}\\begin{{table}}[{}]%",
                indent(n),
                self.position.as_deref().unwrap_or("")
            ));
            if self.centering {
                out.push(format!("{}\\centering", indent(n)));
            }
            if let Some(caption) = &self.caption {
                let short = self
                    .short_caption
                    .as_ref()
                    .map(|s| format!("[{}]", s))
                    .unwrap_or_default();
                out.push(format!("{}\\caption{}{{{}}}%", indent(n + 1), short, caption));
            }
            if let Some(label) = &self.label {
                out.push(format!("{}\\label{{{}{}}}%", indent(n + 1), LABEL_PREFIX, label));
            }
            n += 1;
        } else if self.centering {
            out.push(format!("{}{{\\centering", indent(n)));
        }

        out.push(format!("{}\\begin{{{}}}{{{}}}\\toprule", indent(n), env, self.format));
        out.extend(self.render_rows(columns, rows, n + 1));
        out.push(format!("{}\\end{{{}}}", indent(n), env));

        if self.floating {
            out.push(format!("{}\\end{{table}}", indent(n - 1)));
        } else if self.centering {
            out.push(format!("{}}}", indent(n)));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> Table {
        Table::new()
            .format(["l", "c"])
            .row(0, ["a", "bb"])
            .row(1, ["ccc", "d"])
    }

    #[test]
    fn test_floating_layout() {
        let table = simple()
            .caption("Caption")
            .short_caption("Short")
            .label("lbl")
            .position("h")
            .unwrap();
        assert_eq!(
            table.lines().unwrap(),
            vec![
                "    \\begin{table}[h]%",
                "    \\centering",
                "        \\caption[Short]{Caption}%",
                "        \\label{tab:lbl}%",
                "        \\begin{tabular}{l c}\\toprule",
                "            a   & bb \\tabularnewline",
                "            ccc & d  \\tabularnewline\\bottomrule",
                "        \\end{tabular}",
                "    \\end{table}",
            ]
        );
    }

    #[test]
    fn test_non_floating_drops_label() {
        let table = simple().floating(false).label("lbl");
        assert_eq!(
            table.lines().unwrap(),
            vec![
                "    {\\centering",
                "    \\begin{tabular}{l c}\\toprule",
                "        a   & bb \\tabularnewline",
                "        ccc & d  \\tabularnewline\\bottomrule",
                "    \\end{tabular}",
                "    }",
            ]
        );
    }

    #[test]
    fn test_non_floating_without_centering() {
        let lines = simple().floating(false).centering(false).lines().unwrap();
        assert_eq!(lines.first().unwrap(), "    \\begin{tabular}{l c}\\toprule");
        assert_eq!(lines.last().unwrap(), "    \\end{tabular}");
    }

    #[test]
    fn test_column_overflow() {
        let table = Table::new().format(["l"]).entry(1, 0, "x");
        match table.lines() {
            Err(Error::Configuration(message)) => {
                assert!(message.contains("more columns requested than defined: 2 > 1"))
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_position() {
        assert!(matches!(Table::new().position("x"), Err(Error::Configuration(_))));
        for p in POSITIONS {
            assert!(Table::new().position(p).is_ok());
        }
    }

    #[test]
    fn test_multicolumn_suppresses_inner_separators() {
        let table = Table::new()
            .format(["l", "l", "l"])
            .floating(false)
            .centering(false)
            .entry(0, 0, &multicolumn(2, "c", "X"))
            .entry(2, 0, "Y");
        let row = &table.lines().unwrap()[1];
        assert_eq!(row, "        \\multicolumn{2}{c}{X} & Y \\tabularnewline\\bottomrule");
        assert_eq!(row.matches(" & ").count(), 1);
    }

    #[test]
    fn test_multirow_activates_rows_below() {
        let table = Table::new()
            .format(["l", "l"])
            .floating(false)
            .centering(false)
            .entry(0, 0, &multirow(3, "M"))
            .entry(1, 0, "a");
        let lines = table.lines().unwrap();
        // begin, three rows, end
        assert_eq!(lines.len(), 5);
        assert!(lines[3].ends_with("\\bottomrule"));
        assert!(lines[2].contains(" & "));
    }

    #[test]
    fn test_empty_table() {
        let lines = Table::new().lines().unwrap();
        assert_eq!(
            lines,
            vec![
                "    \\begin{table}[]%",
                "    \\centering",
                "        \\begin{tabular}{}\\toprule",
                "        \\end{tabular}",
                "    \\end{table}",
            ]
        );

        let lines = Table::new().floating(false).centering(false).lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(!lines.iter().any(|l| l.contains("\\bottomrule")));
    }

    #[test]
    fn test_oversized_span_is_rejected() {
        let table = Table::new()
            .format(["l"])
            .entry(0, 1, &multirow(usize::MAX, "x"));
        assert!(matches!(table.lines(), Err(Error::Usage(_))));

        let table = Table::new()
            .format(["l", "l"])
            .entry(usize::MAX, 0, "\\multicolumn{2}{c}{x}");
        assert!(matches!(table.lines(), Err(Error::Usage(_))));

        let table = Table::new()
            .format(["l"])
            .entry(0, 0, &multirow(MAX_SPAN + 1, "x"));
        assert!(matches!(table.lines(), Err(Error::Usage(_))));

        let table = Table::new().format(["l"]).entry(0, 0, &multirow(4, "x"));
        assert_eq!(table.lines().unwrap().len(), 9);
    }

    #[test]
    fn test_color_padding() {
        let table = Table::new()
            .format(["l"])
            .floating(false)
            .centering(false)
            .entry(0, 0, "ab")
            .color(0, 0, "red")
            .entry(0, 1, "x");
        let lines = table.lines().unwrap();
        assert_eq!(lines[1], "        {\\cellcolor{red}}ab \\tabularnewline");
        let padded = format!("        x{} \\tabularnewline\\bottomrule", " ".repeat(18));
        assert_eq!(lines[2], padded);
    }

    #[test]
    fn test_longtable_end_head_and_midrule() {
        let table = simple()
            .environment(TableEnvironment::Longtable)
            .end_head(0)
            .midrule(0);
        let lines = table.lines().unwrap();
        assert!(lines.iter().any(|l| l.ends_with("\\tabularnewline\\midrule\\endhead")));
        assert!(lines.iter().any(|l| l.contains("\\begin{longtable}")));

        let tabular = simple().end_head(0).lines().unwrap();
        assert!(!tabular.iter().any(|l| l.contains("\\endhead")));
    }

    #[test]
    fn test_column_helpers() {
        let table = Table::new()
            .format(["l", "l"])
            .column(0, ["a", "b"])
            .column_from(1, 1, ["c"]);
        let (cols, rows) = table.extent().unwrap();
        assert_eq!((cols, rows), (2, 2));
    }

    #[test]
    fn test_span_helpers() {
        assert_eq!(multirow(2, "x"), "\\multirow{2}{*}{x}");
        assert_eq!(multirow_with_width(2, "3cm", "x"), "\\multirow{2}{3cm}{x}");
        assert_eq!(multicolumn(3, "c", "x"), "\\multicolumn{3}{c}{x}");
    }

    #[test]
    fn test_default_packages() {
        let names: Vec<_> = Table::new()
            .packages()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["booktabs", "longtable", "caption", "multirow", "xcolor"]);
    }
}
