//! Configuration snapshot for one planning pass.

use serde::{Deserialize, Deserializer, Serialize};

/// Character limit used when none (or a nonsensical one) is configured.
pub const DEFAULT_CHAR_LIMIT: usize = 500;

/// Everything the planner reads besides the text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Maximum characters per post
    #[serde(default = "default_char_limit", deserialize_with = "lenient_char_limit")]
    pub char_limit: usize,

    /// Append a `🧵i/n` tag to every post
    #[serde(default = "default_true")]
    pub pagination: bool,

    /// Prefer breaking at the end of a sentence over a later word break
    #[serde(default = "default_true")]
    pub sentence_endings: bool,

    /// Repeat the first post's `@user@domain` mentions on every reply
    #[serde(default)]
    pub include_mentions: bool,

    /// Content warning shared by every post (may be empty)
    #[serde(default)]
    pub content_warning: String,
}

fn default_char_limit() -> usize {
    DEFAULT_CHAR_LIMIT
}

fn default_true() -> bool {
    true
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            char_limit: default_char_limit(),
            pagination: true,
            sentence_endings: true,
            include_mentions: false,
            content_warning: String::new(),
        }
    }
}

impl SplitOptions {
    /// The limit to plan with; zero falls back to the default.
    pub fn effective_limit(&self) -> usize {
        if self.char_limit == 0 {
            DEFAULT_CHAR_LIMIT
        } else {
            self.char_limit
        }
    }

    /// The content warning as it will be sent (surrounding whitespace removed).
    pub fn content_warning(&self) -> &str {
        self.content_warning.trim()
    }
}

/// Parse a user-entered limit the forgiving way: leading digits are used,
/// anything non-numeric or non-positive becomes [`DEFAULT_CHAR_LIMIT`].
pub fn parse_char_limit(raw: &str) -> usize {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<usize>() {
        Ok(limit) if limit > 0 => limit,
        _ => DEFAULT_CHAR_LIMIT,
    }
}

/// Accept integers or strings for `char_limit`, never failing the whole file.
fn lenient_char_limit<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLimit {
        Number(i64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match RawLimit::deserialize(deserializer)? {
        RawLimit::Number(n) if n > 0 => n as usize,
        RawLimit::Text(s) => parse_char_limit(&s),
        _ => DEFAULT_CHAR_LIMIT,
    })
}
