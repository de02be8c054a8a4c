//! Key/value option maps as used by packages, the document class and
//! preamble commands.
//!
//! Options are kept in a [`BTreeMap`] so that the rendered form is sorted by
//! key and therefore stable between runs. An empty value denotes a flag
//! option (`[draft]`) while a non-empty value renders as `key=value`.

use std::collections::BTreeMap;

pub type Options = BTreeMap<String, String>;

/// Builds an option map from `(key, value)` pairs.
pub fn options<K, V, I>(pairs: I) -> Options
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Builds an option map consisting only of flag options.
pub fn flags<S, I>(keys: I) -> Options
where
    S: Into<String>,
    I: IntoIterator<Item = S>,
{
    keys.into_iter().map(|k| (k.into(), String::new())).collect()
}

/// Joins the options as `key=value` or `key`, separated by commas.
///
/// Blank keys are skipped.
pub fn join_options(options: &Options) -> String {
    options
        .iter()
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| {
            if value.trim().is_empty() {
                key.clone()
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders the options in the bracketed LaTeX form, e.g. `[a=b,c]`.
///
/// ```
/// use texforge_core::options::{options, to_options};
///
/// let opts = options([("draft", ""), ("a4paper", ""), ("DIV", "calc")]);
/// assert_eq!(to_options(&opts), "[DIV=calc,a4paper,draft]");
/// ```
pub fn to_options(options: &Options) -> String {
    format!("[{}]", join_options(options))
}
