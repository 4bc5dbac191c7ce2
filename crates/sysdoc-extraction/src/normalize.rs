//! Canonical-name rules.
//!
//! Every function here is pure and total: the same raw mention normalizes to
//! the same canonical name in any document.

use crate::patterns::RE_VERSION_SEGMENT;

/// Methods recognised in endpoint mentions.
pub const HTTP_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':'];

/// Lower-case, turn every run of non-alphanumeric chars into `_`, strip
/// leading and trailing `_`.
///
/// `" User-ID "` → `"user_id"`, `"Order  Items"` → `"order_items"`.
pub fn normalize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

/// Table names drop any schema qualifier: `public.Users` → `users`.
pub fn normalize_table_name(raw: &str) -> String {
    let unqualified = raw.trim().rsplit('.').next().unwrap_or_default();
    normalize_identifier(unqualified)
}

/// `"{table}.{column}"` with both parts normalized. `None` when either part
/// normalizes to nothing.
pub fn column_name(table: &str, column: &str) -> Option<String> {
    let column = normalize_identifier(column);
    if table.is_empty() || column.is_empty() {
        return None;
    }
    Some(format!("{table}.{column}"))
}

/// Normalize an endpoint path.
///
/// Query and fragment are dropped, trailing `.,;:` stripped, the path is
/// lower-cased, `:param` segments become `{param}`, empty segments collapse
/// and a trailing `/` is removed unless the path is `/`.
pub fn normalize_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(TRAILING_PUNCTUATION);
    let trimmed = trimmed.split(&['?', '#'][..]).next().unwrap_or_default();
    if !trimmed.starts_with('/') {
        return None;
    }
    let segments: Vec<String> = trimmed
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let segment = segment.to_lowercase();
            match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => format!("{{{name}}}"),
                _ => segment,
            }
        })
        .collect();
    Some(format!("/{}", segments.join("/")))
}

/// `"{METHOD} {path}"`, e.g. `post /api/Users/` → `POST /api/users`.
pub fn normalize_endpoint(method: &str, path: &str) -> Option<String> {
    let method = method.trim().to_ascii_uppercase();
    if !HTTP_METHODS.contains(&method.as_str()) {
        return None;
    }
    let path = normalize_path(path)?;
    Some(format!("{method} {path}"))
}

/// The resource an endpoint path operates on: its first identifier segment
/// after `api` and version segments. `/api/v1/users/{id}` → `users`.
pub fn endpoint_resource(path: &str) -> Option<String> {
    let is_version = |s: &str| {
        RE_VERSION_SEGMENT
            .as_ref()
            .map(|re| re.is_match(s))
            .unwrap_or(false)
    };
    path.split('/')
        .filter(|s| !s.is_empty())
        .find(|s| *s != "api" && !is_version(s) && !s.starts_with('{'))
        .map(normalize_identifier)
        .filter(|name| !name.is_empty())
}

/// Collapse internal whitespace and trim. Case is preserved.
pub fn normalize_phrase(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
