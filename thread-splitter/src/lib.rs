//! Thread splitting engine for character-limited social posts.
//!
//! Turns a long draft into an ordered list of chunks that each fit a post:
//! - Grapheme-accurate length measurement
//! - Manual `---` / `***` / `___` dividers
//! - Sentence-aware and word-aware break points
//! - Per-chunk budgets that reserve room for pagination tags, reply
//!   mentions and the content warning

pub mod budget;
pub mod debounce;
pub mod dividers;
pub mod length;
pub mod options;
pub mod planner;
pub mod render;
pub mod sentence;
pub mod slicer;

pub use budget::{BudgetCalculator, pagination_tag};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use dividers::split_on_dividers;
pub use length::text_length;
pub use options::{DEFAULT_CHAR_LIMIT, SplitOptions, parse_char_limit};
pub use planner::{Chunk, SlicedThread, ThreadPlan, ThreadPlanner, apply_ellipsis, extract_mentions};
pub use render::{RenderedPost, assemble_posts, render_plan};
pub use sentence::last_sentence_end;
pub use slicer::{MAX_ABANDONABLE_CHARS, SliceDecision, SliceReason, SliceResolver};

/// Plan a thread in one call.
pub fn plan_thread(text: &str, options: &SplitOptions) -> ThreadPlan {
    ThreadPlanner::new(options.clone()).plan(text)
}
