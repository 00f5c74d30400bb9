//! SQL utility functions

/// Escape SQL LIKE metacharacters (%, _, \) in caller-supplied text
///
/// The result is meant for a `LIKE ? ESCAPE '\'` comparison.
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// LIKE pattern matching any text that contains `needle` literally
///
/// # Example
///
/// ```
/// use incidents_server::utils::sql::contains_pattern;
///
/// assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
/// assert_eq!(contains_pattern(""), "%%");
/// ```
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like_pattern(needle))
}
