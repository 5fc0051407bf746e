//! Per-chunk character budgets.

use crate::length::text_length;

/// Room kept for a leading and a trailing `…` around mid-sentence breaks.
pub const ELLIPSIS_RESERVE: usize = 2;

/// Pagination tag appended to post `index` (0-based) of `total`.
pub fn pagination_tag(index: usize, total: usize) -> String {
    format!("\n🧵{}/{}", index + 1, total)
}

/// Characters the content warning costs every post: its length plus one
/// separator, or nothing when there is no warning.
pub fn content_warning_cost(content_warning_len: usize) -> usize {
    if content_warning_len == 0 {
        0
    } else {
        content_warning_len + 1
    }
}

/// Computes how many characters of text a chunk may hold.
///
/// The values that stay fixed for a planning pass live on the struct; the
/// chunk index and the mention prefix length vary per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetCalculator {
    max_chars: usize,
    estimated_total: usize,
    content_warning_len: usize,
    pagination: bool,
}

impl BudgetCalculator {
    pub fn new(
        max_chars: usize,
        estimated_total: usize,
        content_warning_len: usize,
        pagination: bool,
    ) -> Self {
        Self {
            max_chars,
            estimated_total,
            content_warning_len,
            pagination,
        }
    }

    /// Usable budget for the chunk at `chunk_index`. Saturates at zero.
    pub fn budget_for(&self, chunk_index: usize, mention_prefix_len: usize) -> usize {
        let mut budget = self.max_chars.saturating_sub(ELLIPSIS_RESERVE);

        if self.pagination {
            let tag = pagination_tag(chunk_index, self.estimated_total);
            budget = budget.saturating_sub(text_length(&tag));
        }

        budget = budget.saturating_sub(mention_prefix_len);
        budget.saturating_sub(content_warning_cost(self.content_warning_len))
    }
}
