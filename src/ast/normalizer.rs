//! Maps calculator glyphs onto the canonical ASCII operators.
//!
//! The mapping is total and context free. Characters it does not know pass
//! through untouched; the lexer reports them.

/// Replacement for a single display glyph, or `None` to keep the character.
fn replacement(c: char) -> Option<&'static str> {
    match c {
        '×' | '·' | '⋅' | '∗' => Some("*"),
        '÷' | '∕' => Some("/"),
        '−' | '–' => Some("-"),
        // Word replacements are padded so they never fuse with a neighbouring
        // identifier ("2π" and "ππ" must stay two tokens).
        'π' => Some(" pi "),
        _ => None,
    }
}

/// Normalizes `input`, keeping for every output character the char index of
/// the input character it came from.
pub fn normalize_chars(input: &str) -> Vec<(usize, char)> {
    let mut out = Vec::with_capacity(input.len());
    for (position, c) in input.chars().enumerate() {
        match replacement(c) {
            Some(text) => out.extend(text.chars().map(|r| (position, r))),
            None => out.push((position, c)),
        }
    }
    out
}

pub fn normalize(input: &str) -> String {
    normalize_chars(input).into_iter().map(|(_, c)| c).collect()
}
