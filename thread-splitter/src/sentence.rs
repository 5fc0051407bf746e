//! Sentence boundary detection using a fixed punctuation heuristic.
//!
//! The rule needs a lookahead (a terminator must not be followed by a closing
//! quote), which the `regex` crate does not support, so this is a small
//! hand-written scanner instead.

/// Emoji presentation selector that may trail `‼`, `⁉` and friends.
const VARIATION_SELECTOR: char = '\u{fe0f}';

fn is_terminator(c: char) -> bool {
    matches!(c, '?' | '.' | '…' | '!' | '‽' | '⁉' | '‼' | '❗' | '\n')
}

fn is_closing_quote(c: char) -> bool {
    // U+2019 doubles as the apostrophe in `dogs’ toys`, so it is not a quote here
    matches!(c, '"' | '\'' | '\u{201d}')
}

/// Find the byte offset of the last sentence boundary in `text`.
///
/// A boundary is a terminator not directly followed by a closing quote (one
/// whitespace character after it is swallowed), or a closing quote followed
/// by a space. The offset points just past the terminator or quote, except
/// for a newline terminator where it points at the newline itself so the
/// newline becomes the discarded separator.
pub fn last_sentence_end(text: &str) -> Option<usize> {
    let mut last = None;
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        let next = pos + c.len_utf8();

        if is_terminator(c) {
            let mut after = next;
            if text[after..].starts_with(VARIATION_SELECTOR) {
                after += VARIATION_SELECTOR.len_utf8();
            }
            let following = text[after..].chars().next();

            if !following.is_some_and(is_closing_quote) {
                last = Some(if c == '\n' { pos } else { after });
                pos = match following {
                    Some(w) if w.is_whitespace() => after + w.len_utf8(),
                    _ => after,
                };
                continue;
            }
        } else if is_closing_quote(c) && text[next..].starts_with(' ') {
            last = Some(next);
        }

        pos = next;
    }

    last
}
