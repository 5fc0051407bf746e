//! Length measurement in user-perceived characters.

use unicode_segmentation::UnicodeSegmentation;

/// Count grapheme clusters, the unit post limits are enforced in.
///
/// A flag or a ZWJ family emoji counts as one character even though it is
/// built from several code points.
pub fn text_length(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte offset where grapheme `index` starts, or `text.len()` past the end.
pub fn grapheme_byte_offset(text: &str, index: usize) -> usize {
    text.grapheme_indices(true)
        .nth(index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
