//! Configuration types.
//!
//! All configuration is read from the environment once at startup and
//! treated as immutable for the process lifetime.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Core workflow configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Literal token that flags a message for publishing (e.g. `:twitter:`).
    pub trigger_token: String,
    /// Minimum delay between accepted posts per user.
    pub rate_limit: Duration,
    /// Number of qualifying reactions required before publish.
    pub reaction_threshold: u32,
    /// Advisory pending-post lifetime. Recorded on the post but never
    /// checked before publish.
    pub pending_expiry: Duration,
    /// Debug override: let a post's author react toward their own quorum.
    pub allow_self_approval: bool,
    /// Whether a declined post is removed (freeing the user to queue again
    /// immediately) or left until overwritten.
    pub delete_on_decline: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            trigger_token: ":twitter:".to_string(),
            rate_limit: Duration::from_secs(60),
            reaction_threshold: 3,
            pending_expiry: Duration::from_secs(900), // 15 minutes
            allow_self_approval: false,
            delete_on_decline: true,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            trigger_token: std::env::var("SOAPBOX_TRIGGER_TOKEN")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.trigger_token),
            rate_limit: Duration::from_secs(env_parse(
                "SOAPBOX_RATE_LIMIT_SECS",
                defaults.rate_limit.as_secs(),
            )?),
            reaction_threshold: env_parse(
                "SOAPBOX_REACTION_THRESHOLD",
                defaults.reaction_threshold,
            )?,
            pending_expiry: Duration::from_secs(env_parse(
                "SOAPBOX_PENDING_EXPIRY_SECS",
                defaults.pending_expiry.as_secs(),
            )?),
            allow_self_approval: env_flag("SOAPBOX_ALLOW_SELF_APPROVAL", false)?,
            delete_on_decline: env_flag("SOAPBOX_DELETE_ON_DECLINE", true)?,
        })
    }
}

/// Chat platform credentials.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: SecretString,
}

impl SlackConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("SLACK_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("SLACK_BOT_TOKEN".into()))?;
        Ok(Self {
            bot_token: SecretString::from(bot_token),
        })
    }
}

/// Social platform credentials.
#[derive(Debug, Clone)]
pub struct XConfig {
    pub bearer_token: SecretString,
    /// Acting account id, required by the repost endpoint.
    pub user_id: String,
}

impl XConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bearer_token = std::env::var("X_BEARER_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("X_BEARER_TOKEN".into()))?;
        let user_id = std::env::var("X_USER_ID")
            .map_err(|_| ConfigError::MissingEnvVar("X_USER_ID".into()))?;
        Ok(Self {
            bearer_token: SecretString::from(bearer_token),
            user_id,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.trigger_token, ":twitter:");
        assert_eq!(config.rate_limit, Duration::from_secs(60));
        assert_eq!(config.reaction_threshold, 3);
        assert!(!config.allow_self_approval);
        assert!(config.delete_on_decline);
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
