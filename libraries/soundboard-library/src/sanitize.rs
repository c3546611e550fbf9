//! Filename and folder-name sanitization

/// Reduce an uploaded filename to a safe single path segment
///
/// Directory components are dropped, runs of whitespace become `_`, anything
/// other than alphanumerics, `.`, `-` and `_` is removed, and leading or
/// trailing dots and underscores are trimmed. May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Reduce a folder name to a safe single path segment
///
/// Path separators, NUL and other control characters are removed and
/// leading dots stripped. Spaces and punctuation are kept so names like
/// `"Sound Effects"` survive unchanged. May return an empty string.
pub fn sanitize_folder_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
        .collect::<String>()
        .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_end()
        .to_string()
}
