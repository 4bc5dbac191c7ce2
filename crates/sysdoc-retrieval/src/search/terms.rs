//! Term extraction for the sparse channel.

/// Lowercased terms of a text.
///
/// Runs of letters, digits and `_` form one term when at least two chars
/// long. CJK ideographs and kana have no word spacing, so each one is a
/// term of its own.
pub fn terms(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, out: &mut Vec<String>| {
        if current.chars().count() >= 2 {
            out.push(current.to_lowercase());
        }
        current.clear();
    };

    for c in text.chars() {
        if is_cjk(c) {
            flush(&mut current, &mut out);
            out.push(c.to_string());
        } else if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else {
            flush(&mut current, &mut out);
        }
    }
    flush(&mut current, &mut out);
    out
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}')
}
