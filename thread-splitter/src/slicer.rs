//! Deciding where a fragment gets cut, and why.

use serde::{Deserialize, Serialize};

use crate::length::{grapheme_byte_offset, text_length};
use crate::sentence::last_sentence_end;

/// Characters we are willing to give up at the end of a chunk to land on a
/// sentence boundary instead of a mid-sentence word break.
pub const MAX_ABANDONABLE_CHARS: usize = 60;

/// Why a chunk ended where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SliceReason {
    /// The rest of the segment fit
    End,
    /// Cut at a sentence boundary
    SentenceEnd,
    /// Cut at whitespace in the middle of a sentence
    Space,
}

/// Result of resolving one fragment against its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceDecision {
    /// Byte offset into the fragment where the chunk ends
    pub end: usize,
    pub reason: SliceReason,
}

/// Picks cut points for fragments.
#[derive(Debug, Clone, Copy)]
pub struct SliceResolver {
    max_chars: usize,
    prefer_sentence_endings: bool,
    max_abandonable: usize,
}

impl SliceResolver {
    /// `max_chars` bounds the window searched for sentence boundaries.
    pub fn new(max_chars: usize, prefer_sentence_endings: bool) -> Self {
        Self {
            max_chars,
            prefer_sentence_endings,
            max_abandonable: MAX_ABANDONABLE_CHARS,
        }
    }

    pub fn with_max_abandonable(mut self, max_abandonable: usize) -> Self {
        self.max_abandonable = max_abandonable;
        self
    }

    /// Decide where to cut `fragment` so the kept part fits `budget`.
    ///
    /// A fragment with no whitespace at all is returned whole with
    /// [`SliceReason::End`]: an oversized post beats dropping text.
    pub fn resolve(&self, fragment: &str, budget: usize) -> SliceDecision {
        if text_length(fragment) <= budget {
            return SliceDecision {
                end: fragment.len(),
                reason: SliceReason::End,
            };
        }

        let budget_offset = grapheme_byte_offset(fragment, budget);
        let space_cut = last_whitespace_at_or_before(fragment, budget_offset);

        if let Some(sentence_cut) = self.sentence_cut(fragment, budget_offset) {
            let space_end = space_cut.unwrap_or(fragment.len());
            if sentence_cut < space_end {
                let abandoned = text_length(&fragment[sentence_cut..space_end]);
                if abandoned < self.max_abandonable {
                    return SliceDecision {
                        end: sentence_cut,
                        reason: SliceReason::SentenceEnd,
                    };
                }
            }
        }

        match space_cut {
            Some(end) => SliceDecision {
                end,
                reason: SliceReason::Space,
            },
            None => SliceDecision {
                end: fragment.len(),
                reason: SliceReason::End,
            },
        }
    }

    /// Last sentence boundary in the search window that still fits the budget.
    fn sentence_cut(&self, fragment: &str, budget_offset: usize) -> Option<usize> {
        if !self.prefer_sentence_endings {
            return None;
        }

        let window = &fragment[..grapheme_byte_offset(fragment, self.max_chars)];
        last_sentence_end(window).filter(|&cut| cut > 0 && cut <= budget_offset)
    }
}

fn last_whitespace_at_or_before(text: &str, offset: usize) -> Option<usize> {
    text.char_indices()
        .take_while(|(i, _)| *i <= offset)
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .last()
}
