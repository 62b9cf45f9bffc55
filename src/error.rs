//! Error types for soapbox.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chat adapter error: {0}")]
    Chat(#[from] ChatError),

    #[error("Social adapter error: {0}")]
    Social(#[from] SocialError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Chat platform adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Failed to send message: {reason}")]
    SendFailed { reason: String },

    #[error("Chat API rejected the call: {reason}")]
    Api { reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Social platform adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    #[error("Publish call failed: {reason}")]
    PublishFailed { reason: String },

    #[error("Repost of {id} failed: {reason}")]
    RepostFailed { id: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
