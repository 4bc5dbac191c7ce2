//! Compiled extraction patterns.
//!
//! Each pattern is compiled once. A pattern that fails to compile is `None`
//! and its rule extracts nothing.

use regex::Regex;
use std::sync::LazyLock;

macro_rules! extraction_pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Endpoints ──────────────────────────────────────────────────────────────
// Any casing, at the start of a line after markdown markers.
extraction_pattern!(
    RE_ENDPOINT_LINE_START,
    r"(?im)^[\s#>*`|\-]*(get|post|put|patch|delete)[ \t]+(/[^\s`'\x22<>|)\]]*)"
);
// Upper-case method anywhere after a non-alphanumeric boundary.
extraction_pattern!(
    RE_ENDPOINT_INLINE,
    r"(?m)(?:^|[^A-Za-z0-9])(GET|POST|PUT|PATCH|DELETE)[ \t]+(/[^\s`'\x22<>|)\]]*)"
);
extraction_pattern!(RE_VERSION_SEGMENT, r"^v\d+$");

// ── Tables ─────────────────────────────────────────────────────────────────
extraction_pattern!(
    RE_TABLE_CAPTION,
    r"(?im)^[\s#*]*(?:table|表格)[ \t]*[:：][ \t]*[`'\x22]?([\w.\-]+)[`'\x22]?[ \t]*$"
);
extraction_pattern!(
    RE_TABLE_HEADING,
    r"(?i)^\s*(?:table[ \t]+)?[`'\x22]?([A-Za-z_][\w]*)[`'\x22]?(?:[ \t]*(?:table|表))?\s*$"
);
extraction_pattern!(RE_SEPARATOR_ROW, r"^[\s|:+\-]*-[\s|:+\-]*$");
extraction_pattern!(
    RE_CREATE_TABLE,
    r"(?is)create[ \t]+table[ \t]+(?:if[ \t]+not[ \t]+exists[ \t]+)?[`'\x22\[]?([\w.]+)[`'\x22\]]?[ \t\r\n]*\((.*?)\)[ \t\r\n]*(?:;|\z)"
);

// ── Domain entities ────────────────────────────────────────────────────────
// Up to four Capitalized or CamelCase words. All-caps tokens (GET, API) never match.
extraction_pattern!(
    RE_CAPITALIZED_PHRASE,
    r"\b[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]+)*(?:[ \t]+[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]+)*){0,3}\b"
);
extraction_pattern!(
    RE_ENTITY_MARKER,
    r"(?:\b(?i:entity|model)\b|實體)[ \t]*[:：]?[ \t]*([A-Z][a-z0-9]+(?:[A-Z][a-z0-9]+)*(?:[ \t]+[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]+)*){0,3})"
);

/// Names of every pattern, used for health reporting.
pub fn all_patterns() -> [(&'static str, &'static LazyLock<Option<Regex>>); 9] {
    [
        ("endpoint_line_start", &RE_ENDPOINT_LINE_START),
        ("endpoint_inline", &RE_ENDPOINT_INLINE),
        ("version_segment", &RE_VERSION_SEGMENT),
        ("table_caption", &RE_TABLE_CAPTION),
        ("table_heading", &RE_TABLE_HEADING),
        ("separator_row", &RE_SEPARATOR_ROW),
        ("create_table", &RE_CREATE_TABLE),
        ("capitalized_phrase", &RE_CAPITALIZED_PHRASE),
        ("entity_marker", &RE_ENTITY_MARKER),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        for (name, pattern) in all_patterns() {
            assert!(pattern.is_some(), "pattern {name} failed to compile");
        }
    }
}
