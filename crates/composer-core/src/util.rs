//! Small text helpers shared by config, transport and submission code.

const EXCERPT_CHARS: usize = 180;

/// Trimmed value, or `None` for missing and whitespace-only input.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether `value` is an absolute `http://` or `https://` URL.
pub fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

/// Single-line excerpt of a server response for error messages.
///
/// Whitespace runs collapse to one space and the result is capped at 180
/// characters.
pub fn compact_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(EXCERPT_CHARS)
        .collect()
}

/// Whether message text has any non-whitespace content.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
