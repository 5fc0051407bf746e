use async_trait::async_trait;
use log::{info, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MastodonError, Result};

/// Who can see a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}

impl Visibility {
    /// Parse visibility from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "unlisted" => Ok(Self::Unlisted),
            "private" | "followers" => Ok(Self::Private),
            "direct" => Ok(Self::Direct),
            _ => Err(MastodonError::ConfigError(format!("Unknown visibility: {}", s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/v1/statuses`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRequest {
    pub status: String,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spoiler_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_id: Option<String>,
}

/// The parts of a created status we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedStatus {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Settings shared by every post of a thread
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    pub visibility: Visibility,
    /// Sent as the spoiler text of every post when non-empty
    pub content_warning: String,
    /// Status the first post replies to
    pub in_reply_to_id: Option<String>,
}

/// Something that can publish a single status
#[async_trait]
pub trait ThreadPoster: Send + Sync {
    async fn post_status(&self, request: StatusRequest) -> Result<PostedStatus>;

    /// Get the poster name for display
    fn name(&self) -> &'static str;
}

/// Where a thread stopped posting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFailure {
    /// 0-based index of the post that failed
    pub index: usize,
    pub error: String,
}

/// Result of posting a whole thread
#[derive(Debug, Clone, Default)]
pub struct ThreadOutcome {
    pub posted: Vec<PostedStatus>,
    pub failure: Option<PostFailure>,
}

impl ThreadOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Post `posts` in order, each replying to the previous one.
///
/// Stops at the first failure; nothing is retried. `on_posted` is called
/// with the number of posts published so far.
pub async fn post_thread<P>(
    poster: &P,
    posts: &[String],
    options: &PostOptions,
    mut on_posted: impl FnMut(usize),
) -> ThreadOutcome
where
    P: ThreadPoster + ?Sized,
{
    let mut outcome = ThreadOutcome::default();
    let mut previous_id = options.in_reply_to_id.clone();
    let spoiler_text = Some(options.content_warning.trim().to_string()).filter(|cw| !cw.is_empty());

    for (index, status) in posts.iter().enumerate() {
        let request = StatusRequest {
            status: status.clone(),
            visibility: options.visibility,
            spoiler_text: spoiler_text.clone(),
            in_reply_to_id: previous_id.clone(),
        };

        match poster.post_status(request).await {
            Ok(posted) => {
                info!("posted {}/{} via {} as {}", index + 1, posts.len(), poster.name(), posted.id);
                previous_id = Some(posted.id.clone());
                outcome.posted.push(posted);
                on_posted(outcome.posted.len());
            }
            Err(e) => {
                warn!("post {} of {} failed: {}", index + 1, posts.len(), e);
                outcome.failure = Some(PostFailure {
                    index,
                    error: e.to_string(),
                });
                break;
            }
        }
    }

    outcome
}

/// Check a reply-to URL. Empty input means "not a reply".
pub fn validate_reply_url(raw: &str) -> Result<Option<Url>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let url = Url::parse(raw)
        .map_err(|_| MastodonError::InvalidReplyUrl("Invalid URL format".to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(Some(url)),
        _ => Err(MastodonError::InvalidReplyUrl(
            "URL must use http or https".to_string(),
        )),
    }
}
