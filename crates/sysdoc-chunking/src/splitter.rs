//! Size-capped text windows on char boundaries.

/// Share of a window (from its end) searched for a soft break.
const SOFT_BREAK_DIVISOR: usize = 5;

/// Full-width terminators end a sentence on their own.
const CJK_TERMINATORS: [char; 3] = ['。', '！', '？'];

/// ASCII terminators end a sentence only when whitespace follows.
const ASCII_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Cut `text` into pieces of at most `max_chars` chars.
///
/// Inside the final fifth of each window a cut prefers the last sentence
/// end (`。！？`, `.!?` plus whitespace, a blank line), then the last
/// whitespace, and falls back to exactly the cap. Concatenating the pieces
/// gives back `text`.
pub fn split_text(text: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 || text.is_empty() {
        return if text.is_empty() { Vec::new() } else { vec![text] };
    }

    let offsets: Vec<(usize, char)> = text.char_indices().collect();
    let total = offsets.len();
    let byte_at = |i: usize| offsets.get(i).map(|(b, _)| *b).unwrap_or(text.len());

    let mut pieces = Vec::new();
    let mut start = 0;
    while total - start > max_chars {
        let end = start + max_chars;
        let soft_floor = end - (max_chars / SOFT_BREAK_DIVISOR).max(1);
        let window = soft_floor.max(start)..end;
        let cut = window
            .clone()
            .rev()
            .find_map(|i| sentence_end(&offsets, i, end))
            .or_else(|| {
                window
                    .rev()
                    .find(|&i| offsets[i].1.is_whitespace())
                    .map(|i| i + 1)
            })
            .unwrap_or(end);
        pieces.push(&text[byte_at(start)..byte_at(cut)]);
        start = cut;
    }
    if start < total {
        pieces.push(&text[byte_at(start)..]);
    }
    pieces
}

/// Cut position after a sentence ending at char `i`, if it fits by `end`.
/// Whitespace closing an ASCII sentence stays with that sentence.
fn sentence_end(chars: &[(usize, char)], i: usize, end: usize) -> Option<usize> {
    let c = chars[i].1;
    if CJK_TERMINATORS.contains(&c) {
        return Some(i + 1);
    }
    let next = chars.get(i + 1).map(|(_, n)| *n);
    let closes = (ASCII_TERMINATORS.contains(&c) && next.is_some_and(char::is_whitespace))
        || (c == '\n' && next == Some('\n'));
    (closes && i + 2 <= end).then_some(i + 2)
}
