//! Thread planning: turning a draft into ordered, budget-respecting chunks.
//!
//! Planning runs in two stages. [`ThreadPlanner::slice`] walks every manual
//! segment and records where each chunk was cut and why. [`apply_ellipsis`]
//! then marks mid-sentence breaks with `…` on both sides of the cut.

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::budget::BudgetCalculator;
use crate::dividers::split_on_dividers;
use crate::length::text_length;
use crate::options::SplitOptions;
use crate::slicer::{SliceReason, SliceResolver};

/// Marker placed on both sides of a mid-sentence break.
pub const ELLIPSIS: char = '…';

static MENTION: OnceLock<Regex> = OnceLock::new();

fn mention_regex() -> &'static Regex {
    MENTION.get_or_init(|| Regex::new(r"@\S+@\S+").expect("mention pattern should compile"))
}

/// One post's worth of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub reason: SliceReason,
}

impl Chunk {
    pub fn new(text: impl Into<String>, reason: SliceReason) -> Self {
        Self {
            text: text.into(),
            reason,
        }
    }
}

/// Chunks as cut, before any ellipsis is added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlicedThread {
    pub chunks: Vec<Chunk>,
    pub mention_prefix: String,
    /// Budget each chunk was cut against, parallel to `chunks`
    pub budgets: Vec<usize>,
}

impl SlicedThread {
    pub fn into_plan(self) -> ThreadPlan {
        ThreadPlan {
            chunks: apply_ellipsis(&self.chunks),
            mention_prefix: self.mention_prefix,
        }
    }
}

/// The finished thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPlan {
    pub chunks: Vec<Chunk>,
    /// Mentions from the first chunk, to prepend to every later post
    pub mention_prefix: String,
}

impl ThreadPlan {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Plans threads for a fixed options snapshot.
#[derive(Debug, Clone)]
pub struct ThreadPlanner {
    options: SplitOptions,
}

impl ThreadPlanner {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Split `text` into a finished plan.
    pub fn plan(&self, text: &str) -> ThreadPlan {
        self.slice(text).into_plan()
    }

    /// Cut `text` into chunks without touching their text afterwards.
    pub fn slice(&self, text: &str) -> SlicedThread {
        if text.is_empty() {
            return SlicedThread::default();
        }

        let limit = self.options.effective_limit();
        let segments = split_on_dividers(text);
        let mut estimated_total = naive_chunk_count(text, limit) + segments.len();

        loop {
            let sliced = self.slice_segments(&segments, estimated_total);
            // Tags were sized for `estimated_total`; a longer thread needs wider ones
            if sliced.chunks.len() <= estimated_total {
                return sliced;
            }
            debug!(
                "estimate {} too low for {} chunk(s), re-slicing",
                estimated_total,
                sliced.chunks.len()
            );
            estimated_total = sliced.chunks.len();
        }
    }

    fn slice_segments(&self, segments: &[&str], estimated_total: usize) -> SlicedThread {
        let limit = self.options.effective_limit();
        let budgets = BudgetCalculator::new(
            limit,
            estimated_total,
            text_length(self.options.content_warning()),
            self.options.pagination,
        );
        let resolver = SliceResolver::new(limit, self.options.sentence_endings);
        let mut sliced = SlicedThread::default();
        let mut prefix_len = 0;

        debug!(
            "planning {} segment(s), limit {}, estimated {} chunk(s)",
            segments.len(),
            limit,
            estimated_total
        );

        for segment in segments {
            let mut remaining = *segment;

            while !remaining.is_empty() {
                let index = sliced.chunks.len();
                let prefix_for_chunk = if index == 0 { 0 } else { prefix_len };
                let budget = budgets.budget_for(index, prefix_for_chunk);
                let decision = resolver.resolve(remaining, budget);

                let (kept, rest) = remaining.split_at(decision.end);
                debug!(
                    "chunk {}: cut at byte {} of {} ({:?}, budget {})",
                    index,
                    decision.end,
                    remaining.len(),
                    decision.reason,
                    budget
                );

                sliced.chunks.push(Chunk::new(kept.trim_end(), decision.reason));
                sliced.budgets.push(budget);

                if index == 0 && self.options.include_mentions {
                    sliced.mention_prefix = mention_prefix(&extract_mentions(kept));
                    prefix_len = text_length(&sliced.mention_prefix);
                }

                remaining = rest.trim_start();
            }
        }

        sliced
    }
}

/// Chunk count from length alone, used to size pagination tags before the
/// real count is known.
pub fn naive_chunk_count(text: &str, limit: usize) -> usize {
    text_length(text).div_ceil(limit.max(1))
}

/// All `@user@domain` mentions in `text`, first occurrence order, no repeats.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();
    for found in mention_regex().find_iter(text) {
        if !mentions.iter().any(|m| m == found.as_str()) {
            mentions.push(found.as_str().to_string());
        }
    }
    mentions
}

fn mention_prefix(mentions: &[String]) -> String {
    if mentions.is_empty() {
        String::new()
    } else {
        format!("{}\n", mentions.join(" "))
    }
}

/// Mark mid-sentence breaks: a `space` chunk gets a trailing `…` and the
/// chunk after it a leading one.
pub fn apply_ellipsis(chunks: &[Chunk]) -> Vec<Chunk> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut text = String::with_capacity(chunk.text.len() + 6);
            if i > 0 && chunks[i - 1].reason == SliceReason::Space {
                text.push(ELLIPSIS);
            }
            text.push_str(&chunk.text);
            if chunk.reason == SliceReason::Space {
                text.push(ELLIPSIS);
            }
            Chunk::new(text, chunk.reason)
        })
        .collect()
}
