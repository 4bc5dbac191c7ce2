use sysdoc_core::models::{EntityKind, EntityRef};

use crate::normalize::normalize_phrase;
use crate::patterns::{RE_CAPITALIZED_PHRASE, RE_ENTITY_MARKER};

/// Words that never start or end a domain entity name.
const STOP_WORDS: [&str; 22] = [
    "A", "An", "The", "Table", "Entity", "Entities", "Model", "Models", "Api", "Overview",
    "Introduction", "Summary", "Description", "Example", "Examples", "Request", "Response",
    "Parameters", "Notes", "Appendix", "Schema", "Fields",
];

/// Capitalized phrases of a heading.
pub(crate) fn from_heading(heading: &str, out: &mut Vec<EntityRef>) {
    let Some(re) = RE_CAPITALIZED_PHRASE.as_ref() else {
        return;
    };
    for m in re.find_iter(heading) {
        push_phrase(m.as_str(), out);
    }
}

/// The capitalized phrase right after `Entity`, `Model` or `實體`.
pub(crate) fn from_markers(text: &str, out: &mut Vec<EntityRef>) {
    let Some(re) = RE_ENTITY_MARKER.as_ref() else {
        return;
    };
    for caps in re.captures_iter(text) {
        if let Some(phrase) = caps.get(1) {
            push_phrase(phrase.as_str(), out);
        }
    }
}

fn push_phrase(raw: &str, out: &mut Vec<EntityRef>) {
    let phrase = normalize_phrase(raw);
    let words: Vec<&str> = phrase.split(' ').collect();
    let Some(first) = words.iter().position(|w| !STOP_WORDS.contains(w)) else {
        return;
    };
    let Some(last) = words.iter().rposition(|w| !STOP_WORDS.contains(w)) else {
        return;
    };
    let canonical = words[first..=last].join(" ");
    out.push(EntityRef::new(EntityKind::DomainEntity, canonical, raw));
}
