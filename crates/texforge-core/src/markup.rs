//! Small helpers for producing LaTeX source text.

/// Spaces per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Label prefix for sectioning commands.
pub const SECTION_LABEL_PREFIX: &str = "sec:";

/// Returns the whitespace for `n` indentation levels.
pub fn indent(n: usize) -> String {
    " ".repeat(n * INDENT_WIDTH)
}

/// Inline citation of a bibliography key.
pub fn cite(key: &str) -> String {
    format!("\\cite{{{}}}", key)
}

/// Inline cross-reference through cleveref, e.g. `cref("eq:maxwell")`.
pub fn cref(reference: &str) -> String {
    format!("\\cref{{{}}}", reference)
}

/// Inline quotation via csquotes.
pub fn enquote(text: &str) -> String {
    format!("\\enquote{{{}}}", text)
}

/// Escapes every character that has a special meaning in LaTeX.
pub fn escape_all_chars(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        push_escaped(&mut escaped, c);
    }
    escaped
}

/// Like [`escape_all_chars`], but leaves inline math (`$...$`) untouched.
///
/// ```
/// use texforge_core::markup::escape_chars;
///
/// assert_eq!(escape_chars("50% of $x_1$"), "50\\% of $x_1$");
/// ```
pub fn escape_chars(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    let mut math_mode = false;
    for c in input.chars() {
        if c == '$' {
            math_mode = !math_mode;
            escaped.push(c);
        } else if math_mode {
            escaped.push(c);
        } else {
            push_escaped(&mut escaped, c);
        }
    }
    escaped
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '\\' => out.push_str("\\textbackslash "),
        '#' | '$' | '%' | '_' | '&' | '{' | '}' => {
            out.push('\\');
            out.push(c);
        }
        '~' => out.push_str("\\textasciitilde "),
        '^' => out.push_str("\\textasciicircum "),
        _ => out.push(c),
    }
}
