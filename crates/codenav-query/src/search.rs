//! Free-text to FTS5 query translation.

/// Build an FTS5 `MATCH` expression from user input.
///
/// Input is split into tokens of alphanumerics and `_`; every other character
/// is a separator, so FTS5 operators and quotes in the input never reach the
/// engine. Each token becomes a quoted prefix term and all terms must match.
/// Returns `None` when the input has no tokens.
pub fn build_fts_query(input: &str) -> Option<String> {
    let terms: Vec<String> = input
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|tok| !tok.is_empty())
        .map(|tok| format!("\"{tok}\"*"))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}
