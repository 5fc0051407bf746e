//! Turning a plan into postable strings and preview markup.

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::OnceLock;

use crate::budget::{content_warning_cost, pagination_tag};
use crate::length::text_length;
use crate::options::SplitOptions;
use crate::planner::ThreadPlan;

/// Where bare hashtags link to.
const HASHTAG_BASE: &str = "https://mastodon.social/tags";

static LINKABLE: OnceLock<Regex> = OnceLock::new();

/// URLs, `@user@domain` mentions and hashtags, matched in a single pass so a
/// `#` inside a URL never becomes a second link.
fn linkable_regex() -> &'static Regex {
    LINKABLE.get_or_init(|| {
        Regex::new(r"(https?://\S+)|@(\S+?)@(\S+)|#(\w+)").expect("linkable pattern should compile")
    })
}

/// A chunk ready to show or post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPost {
    pub index: usize,
    pub total: usize,
    /// Exactly what gets posted: mention prefix, text, pagination tag
    pub body: String,
    /// HTML preview of the body without the pagination tag
    pub markup: String,
    /// Pagination tag, empty when pagination is off
    pub pagination: String,
    /// Characters the server will count, content warning included
    pub char_count: usize,
    pub copy_label: String,
}

impl RenderedPost {
    pub fn over_limit(&self, limit: usize) -> bool {
        self.char_count > limit
    }
}

/// Screen-reader friendly label for copying post `index` of `total`.
pub fn copy_label(index: usize, total: usize) -> String {
    format!("Copy chunk {} of {}", index + 1, total)
}

/// Characters a post costs: text plus tag, plus the content warning and its
/// separator when there is one.
pub fn char_count(text: &str, pagination: &str, content_warning: &str) -> usize {
    text_length(text) + text_length(pagination) + content_warning_cost(text_length(content_warning))
}

/// The final strings to post, in order.
pub fn assemble_posts(plan: &ThreadPlan, options: &SplitOptions) -> Vec<String> {
    render_plan(plan, options)
        .into_iter()
        .map(|post| post.body)
        .collect()
}

/// Render every chunk of `plan` for preview and posting.
pub fn render_plan(plan: &ThreadPlan, options: &SplitOptions) -> Vec<RenderedPost> {
    let total = plan.len();

    plan.chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let mut display = String::new();
            if index > 0 {
                display.push_str(&plan.mention_prefix);
            }
            display.push_str(&chunk.text);

            let pagination = if options.pagination {
                pagination_tag(index, total)
            } else {
                String::new()
            };

            RenderedPost {
                index,
                total,
                body: format!("{}{}", display, pagination),
                markup: format_markup(&display),
                char_count: char_count(&display, &pagination, options.content_warning()),
                pagination,
                copy_label: copy_label(index, total),
            }
        })
        .collect()
}

/// Escape text for safe inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML preview of post text: escaped, with links for URLs, remote
/// mentions and hashtags, and `<br>` for newlines.
pub fn format_markup(text: &str) -> String {
    let escaped = escape_html(text);

    let linked = linkable_regex().replace_all(&escaped, |caps: &Captures| {
        if let Some(url) = caps.get(1) {
            format!(r#"<a href="{0}" target="_blank">{0}</a>"#, url.as_str())
        } else if let (Some(user), Some(domain)) = (caps.get(2), caps.get(3)) {
            format!(
                r#"<a href="https://{}/@{}" target="_blank">{}</a>"#,
                domain.as_str(),
                user.as_str(),
                &caps[0]
            )
        } else {
            let tag = &caps[4];
            format!(r#"<a href="{}/{}" target="_blank">#{}</a>"#, HASHTAG_BASE, tag, tag)
        }
    });

    linked.replace('\n', "<br>")
}
