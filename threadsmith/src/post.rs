//! Publishing a planned thread to Mastodon.

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use mastodon_client::{
    Config, MastodonClient, PostOptions, PostedStatus, ResolvedStatus, ThreadPoster, Visibility,
    post_thread, validate_reply_url,
};
use regex::Regex;
use std::sync::OnceLock;
use thread_splitter::{SplitOptions, ThreadPlan, assemble_posts, extract_mentions, plan_thread};

static HTML_TAG: OnceLock<Regex> = OnceLock::new();

fn html_tag_regex() -> &'static Regex {
    HTML_TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern should compile"))
}

/// Everything `post` needs besides the text.
#[derive(Debug, Clone)]
pub struct PostSettings {
    pub visibility: Visibility,
    pub reply_to_url: String,
    pub dry_run: bool,
}

/// Direct posts only reach the people mentioned in each post, so the first
/// chunk must mention someone and the mentions must be carried forward.
pub fn check_direct_visibility(
    visibility: Visibility,
    plan: &ThreadPlan,
    include_mentions: bool,
) -> Result<()> {
    if visibility != Visibility::Direct {
        return Ok(());
    }

    let first_mentions = plan
        .chunks
        .first()
        .map(|chunk| extract_mentions(&chunk.text))
        .unwrap_or_default();

    if first_mentions.is_empty() || !include_mentions {
        bail!(
            "Posts with a Direct visibility must include a username in each post. \
             Add one or more usernames to the first section and enable mentions in replies (--mentions)."
        );
    }
    Ok(())
}

/// People in the conversation being replied to: mentions in the status
/// body, then its author.
pub fn reply_mentions(status: &ResolvedStatus) -> Vec<String> {
    let plain = html_tag_regex().replace_all(&status.content, " ");
    let mut mentions = extract_mentions(&plain);

    let author = format!("@{}", status.account.acct);
    if !mentions.contains(&author) {
        mentions.push(author);
    }
    mentions
}

/// `text` with the reply mentions it lacks prepended, or `None` when every
/// one of them is already there.
pub fn merge_reply_mentions(text: &str, status: &ResolvedStatus) -> Option<String> {
    let missing: Vec<String> = reply_mentions(status)
        .into_iter()
        .filter(|mention| !text.contains(mention.as_str()))
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(format!("{} {}", missing.join(" "), text))
    }
}

/// Plan `text` and check it can be posted.
fn postable(text: &str, options: &SplitOptions, visibility: Visibility) -> Result<Vec<String>> {
    let plan = plan_thread(text, options);
    let posts = assemble_posts(&plan, options);
    if posts.is_empty() {
        bail!("No text to post");
    }

    check_direct_visibility(visibility, &plan, options.include_mentions)?;
    Ok(posts)
}

/// Validate, resolve, plan and post `text`.
pub async fn run(text: &str, mut options: SplitOptions, settings: &PostSettings) -> Result<()> {
    let reply_url = validate_reply_url(&settings.reply_to_url)?;

    if settings.dry_run {
        let posts = postable(text, &options, settings.visibility)?;
        eprintln!(
            "Dry run: {} post(s), visibility {}{}",
            posts.len(),
            settings.visibility,
            reply_url
                .as_ref()
                .map(|u| format!(", replying to {} (mentions not resolved)", u))
                .unwrap_or_default()
        );
        for (i, post) in posts.iter().enumerate() {
            println!("--- post {} ---\n{}\n", i + 1, post);
        }
        return Ok(());
    }

    let config = Config::load().context("Failed to load credentials")?;
    let credentials = config.require_credentials()?;
    let client = MastodonClient::from_credentials(credentials);

    let mut text = text.to_string();
    let in_reply_to_id = match reply_url {
        Some(url) => {
            eprintln!("Resolving reply-to post...");
            let resolved = client
                .resolve_status_url(url.as_str())
                .await
                .context("Failed to resolve reply-to post")?;
            eprintln!("Replying to @{}", resolved.account.acct);

            if let Some(merged) = merge_reply_mentions(&text, &resolved) {
                text = merged;
                options.include_mentions = true;
            }
            Some(resolved.id)
        }
        None => None,
    };

    let posts = postable(&text, &options, settings.visibility)?;
    let post_options = PostOptions {
        visibility: settings.visibility,
        content_warning: options.content_warning().to_string(),
        in_reply_to_id,
    };

    eprintln!("Posting {} post(s) to {}...", posts.len(), credentials.instance);
    let posted = publish(&client, &posts, &post_options, true).await?;

    if let Some(url) = posted.first().and_then(|s| s.url.as_deref()) {
        println!("{}", url);
    }
    Ok(())
}

/// Post the thread with a progress bar, turning a partial failure into an
/// error naming the post that failed.
pub async fn publish<P>(
    poster: &P,
    posts: &[String],
    options: &PostOptions,
    show_progress: bool,
) -> Result<Vec<PostedStatus>>
where
    P: ThreadPoster + ?Sized,
{
    let pb = if show_progress {
        ProgressBar::new(posts.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let outcome = post_thread(poster, posts, options, |done| pb.set_position(done as u64)).await;

    match outcome.failure {
        None => {
            pb.finish_with_message("Thread posted successfully!");
            Ok(outcome.posted)
        }
        Some(failure) => {
            pb.abandon();
            bail!("Failed to post item {}: {}", failure.index + 1, failure.error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastodon_client::MockPoster;

    fn options(include_mentions: bool) -> SplitOptions {
        SplitOptions {
            char_limit: 40,
            include_mentions,
            ..SplitOptions::default()
        }
    }

    /// A status as `/api/v2/search` returns it.
    fn resolved_status() -> ResolvedStatus {
        serde_json::from_str(
            r#"{
                "id": "1107",
                "content": "<p><span class=\"h-card\">@cat@c.social</span> have you seen <b>this</b>?</p><p>cc @dan@d.social</p>",
                "account": {"acct": "amy@a.social", "display_name": "Amy"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_direct_requires_mentions() {
        let plan = plan_thread("@amy@a.social hello there", &options(true));
        assert!(check_direct_visibility(Visibility::Direct, &plan, true).is_ok());

        let err = check_direct_visibility(Visibility::Direct, &plan, false).unwrap_err();
        assert!(err.to_string().contains("Direct visibility"));

        let plan = plan_thread("hello there, nobody", &options(true));
        assert!(check_direct_visibility(Visibility::Direct, &plan, true).is_err());
    }

    #[test]
    fn test_non_direct_skips_check() {
        let plan = plan_thread("hello there, nobody", &options(false));
        assert!(check_direct_visibility(Visibility::Public, &plan, false).is_ok());
        assert!(check_direct_visibility(Visibility::Private, &plan, false).is_ok());
    }

    #[test]
    fn test_reply_mentions_from_content_then_author() {
        assert_eq!(
            reply_mentions(&resolved_status()),
            vec!["@cat@c.social", "@dan@d.social", "@amy@a.social"]
        );
    }

    #[test]
    fn test_local_author_gets_bare_handle() {
        let mut status = resolved_status();
        status.content = "<p>no mentions</p>".to_string();
        status.account.acct = "amy".to_string();
        assert_eq!(reply_mentions(&status), vec!["@amy"]);
    }

    #[test]
    fn test_merge_prepends_missing_mentions_only() {
        let merged = merge_reply_mentions("@dan@d.social agreed!", &resolved_status()).unwrap();
        assert_eq!(merged, "@cat@c.social @amy@a.social @dan@d.social agreed!");

        let opts = SplitOptions {
            include_mentions: true,
            ..SplitOptions::default()
        };
        let plan = plan_thread(&merged, &opts);
        assert_eq!(plan.mention_prefix, "@cat@c.social @amy@a.social @dan@d.social\n");
    }

    #[test]
    fn test_merge_noop_when_all_present() {
        let text = "@amy@a.social @cat@c.social @dan@d.social thanks";
        assert_eq!(merge_reply_mentions(text, &resolved_status()), None);
    }

    #[tokio::test]
    async fn test_publish_success() {
        let poster = MockPoster::always_succeeds();
        let posts = vec!["one".to_string(), "two".to_string()];
        let posted = publish(&poster, &posts, &PostOptions::default(), false)
            .await
            .unwrap();
        assert_eq!(posted.len(), 2);
        assert_eq!(poster.call_count(), 2);
    }

    #[tokio::test]
    async fn test_publish_reports_failing_item() {
        let poster = MockPoster::fails_at(1);
        let posts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let err = publish(&poster, &posts, &PostOptions::default(), false)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to post item 2: "));
        assert_eq!(poster.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_needs_no_login() {
        let settings = PostSettings {
            visibility: Visibility::Unlisted,
            reply_to_url: String::new(),
            dry_run: true,
        };
        assert!(run("Just a short note.", options(false), &settings).await.is_ok());
    }

    #[tokio::test]
    async fn test_bad_reply_url_rejected_before_posting() {
        let settings = PostSettings {
            visibility: Visibility::Public,
            reply_to_url: "ftp://nope".to_string(),
            dry_run: true,
        };
        let err = run("Just a short note.", options(false), &settings)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid reply-to URL"));
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let settings = PostSettings {
            visibility: Visibility::Public,
            reply_to_url: String::new(),
            dry_run: true,
        };
        let err = run("", options(false), &settings).await.unwrap_err();
        assert_eq!(err.to_string(), "No text to post");
    }
}
