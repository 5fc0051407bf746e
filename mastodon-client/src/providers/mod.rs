//! Poster implementations

pub mod mastodon;
pub mod mock;

pub use mastodon::{Account, MastodonClient, ResolvedStatus};
pub use mock::MockPoster;
