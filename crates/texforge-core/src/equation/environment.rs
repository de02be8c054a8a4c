use std::fmt;

/// The amsmath environments an [`Equation`](super::Equation) can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Equation,
    Align,
    Aligned,
    Gather,
    Gathered,
    Alignat,
    Alignedat,
    Cases,
    Flalign,
    Multline,
    Split,
}

impl Environment {
    /// The environment name as written in LaTeX.
    pub fn name(self) -> &'static str {
        match self {
            Environment::Equation => "equation",
            Environment::Align => "align",
            Environment::Aligned => "aligned",
            Environment::Gather => "gather",
            Environment::Gathered => "gathered",
            Environment::Alignat => "alignat",
            Environment::Alignedat => "alignedat",
            Environment::Cases => "cases",
            Environment::Flalign => "flalign",
            Environment::Multline => "multline",
            Environment::Split => "split",
        }
    }

    /// Whether a `*` variant without numbering exists.
    pub fn can_be_starred(self) -> bool {
        matches!(
            self,
            Environment::Equation
                | Environment::Align
                | Environment::Gather
                | Environment::Alignat
                | Environment::Flalign
                | Environment::Multline
        )
    }

    /// Whether the environment is only valid inside another math environment.
    pub fn math_mode_only(self) -> bool {
        matches!(
            self,
            Environment::Aligned
                | Environment::Gathered
                | Environment::Alignedat
                | Environment::Cases
                | Environment::Split
        )
    }

    /// Whether the environment takes a mandatory column count.
    pub fn has_columns(self) -> bool {
        matches!(self, Environment::Alignat | Environment::Alignedat)
    }

    /// Whether the environment holds exactly one numbered statement.
    pub fn single_statement(self) -> bool {
        matches!(self, Environment::Equation | Environment::Multline)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
