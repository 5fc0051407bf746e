//! Minimal Mastodon client for posting reply threads
//!
//! Covers what a thread poster needs:
//! - OAuth app registration and PKCE login
//! - Credentials stored in a TOML file
//! - Posting statuses as a reply chain
//! - Resolving a post URL to a status id to reply to

pub mod config;
pub mod error;
pub mod oauth;
pub mod poster;
pub mod providers;

pub use config::{Config, Credentials, PendingAuth, instance_url, normalize_instance};
pub use error::{MastodonError, Result};
pub use oauth::OAuthClient;
pub use poster::{
    PostFailure, PostOptions, PostedStatus, StatusRequest, ThreadOutcome, ThreadPoster,
    Visibility, post_thread, validate_reply_url,
};
pub use providers::{MastodonClient, MockPoster, ResolvedStatus};
