//! Document-type detection by keyword scoring.

use std::collections::HashSet;

use sysdoc_core::models::DocType;

const API_KEYWORDS: [&str; 7] = ["endpoint", "api", "http", "request", "response", "get", "post"];
const TABLE_KEYWORDS: [&str; 6] = ["table", "column", "primary key", "foreign key", "schema", "field"];
const DESIGN_KEYWORDS: [&str; 6] = ["architecture", "component", "module", "flow", "diagram", "design"];

/// Classify a document from its full text.
///
/// Each family scores the number of its distinct keywords present as whole
/// words (or phrases). The highest score wins, ties resolve in the order
/// api_spec, table_schema, system_design. No keyword at all gives `general`.
pub fn detect_doc_type(text: &str) -> DocType {
    let lower = text.to_lowercase();
    let words: HashSet<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let score = |keywords: &[&str]| {
        keywords
            .iter()
            .filter(|kw| {
                if kw.contains(' ') {
                    lower.contains(**kw)
                } else {
                    words.contains(**kw)
                }
            })
            .count()
    };

    let api = score(&API_KEYWORDS);
    let table = score(&TABLE_KEYWORDS);
    let design = score(&DESIGN_KEYWORDS);
    let best = api.max(table).max(design);

    if best == 0 {
        DocType::General
    } else if api == best {
        DocType::ApiSpec
    } else if table == best {
        DocType::TableSchema
    } else {
        DocType::SystemDesign
    }
}
