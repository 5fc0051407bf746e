//! Printing a planned thread for review.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use thread_splitter::render::escape_html;
use thread_splitter::{RenderedPost, SplitOptions, ThreadPlan, render_plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text with a header per post
    Text,
    /// The plan and rendered posts as JSON
    Json,
    /// HTML preview fragments
    Html,
}

#[derive(Serialize)]
struct JsonPreview<'a> {
    plan: &'a ThreadPlan,
    posts: Vec<RenderedPost>,
}

/// Render `plan` in the requested format.
pub fn render(plan: &ThreadPlan, options: &SplitOptions, format: OutputFormat) -> Result<String> {
    let posts = render_plan(plan, options);
    Ok(match format {
        OutputFormat::Text => render_text(&posts, options),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonPreview { plan, posts })?,
        OutputFormat::Html => render_html(&posts, options),
    })
}

fn render_text(posts: &[RenderedPost], options: &SplitOptions) -> String {
    if posts.is_empty() {
        return "(nothing to post)\n".to_string();
    }

    let limit = options.effective_limit();
    let mut out = String::new();

    for post in posts {
        let warning = if post.over_limit(limit) { "  OVER LIMIT" } else { "" };
        out.push_str(&format!(
            "── {}/{} · {}/{} characters{} ──\n",
            post.index + 1,
            post.total,
            post.char_count,
            limit,
            warning
        ));
        if !options.content_warning().is_empty() {
            out.push_str(&format!("CW: {}\n", options.content_warning()));
        }
        out.push_str(&post.body);
        out.push_str("\n\n");
    }

    out
}

fn render_html(posts: &[RenderedPost], options: &SplitOptions) -> String {
    let cw_html = if options.content_warning().is_empty() {
        String::new()
    } else {
        format!(
            "<div class=\"content-warning-display\">{}</div>",
            escape_html(options.content_warning())
        )
    };

    posts
        .iter()
        .map(|post| {
            let pagination = if post.pagination.is_empty() {
                String::new()
            } else {
                format!(
                    "<br><span class=\"post-number\">{}</span>",
                    escape_html(post.pagination.trim_start())
                )
            };
            format!(
                "<div class=\"post-container\">\n  <div class=\"chunk-text\">\n    \
                 <button class=\"btn-copy\" data-text=\"{}\" aria-pressed=\"false\">{}</button>\n    \
                 <span class=\"char-count\">{} characters</span>\n    {}{}{}\n  </div>\n</div>\n",
                escape_html(&post.body),
                escape_html(&post.copy_label),
                post.char_count,
                cw_html,
                post.markup,
                pagination
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thread_splitter::plan_thread;

    fn options() -> SplitOptions {
        SplitOptions {
            char_limit: 60,
            ..SplitOptions::default()
        }
    }

    #[test]
    fn test_text_preview() {
        let plan = plan_thread("First part.\n---\nSecond part.", &options());
        let out = render(&plan, &options(), OutputFormat::Text).unwrap();
        assert!(out.contains("── 1/2 · "));
        assert!(out.contains("First part.\n🧵1/2"));
        assert!(out.contains("Second part.\n🧵2/2"));
        assert!(!out.contains("OVER LIMIT"));
    }

    #[test]
    fn test_text_preview_empty() {
        let plan = plan_thread("", &options());
        let out = render(&plan, &options(), OutputFormat::Text).unwrap();
        assert_eq!(out, "(nothing to post)\n");
    }

    #[test]
    fn test_json_preview() {
        let plan = plan_thread("Only one.", &options());
        let out = render(&plan, &options(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["plan"]["chunks"][0]["text"], "Only one.");
        assert_eq!(value["plan"]["chunks"][0]["reason"], "end");
        assert_eq!(value["posts"][0]["body"], "Only one.\n🧵1/1");
    }

    #[test]
    fn test_html_preview() {
        let opts = SplitOptions {
            content_warning: "<cw>".to_string(),
            ..options()
        };
        let plan = plan_thread("#rust is fun", &opts);
        let out = render(&plan, &opts, OutputFormat::Html).unwrap();
        assert!(out.contains("Copy chunk 1 of 1"));
        assert!(out.contains("/tags/rust"));
        assert!(out.contains("&lt;cw&gt;"));
        assert!(out.contains("🧵1/1"));
    }
}
