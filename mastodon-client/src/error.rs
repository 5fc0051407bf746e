use thiserror::Error;

#[derive(Error, Debug)]
pub enum MastodonError {
    #[error("Not logged in. Run `threadsmith login <instance>` first.")]
    MissingCredentials,

    #[error("Invalid reply-to URL: {0}")]
    InvalidReplyUrl(String),

    #[error("Could not find a post at {0}")]
    StatusNotFound(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, MastodonError>;
