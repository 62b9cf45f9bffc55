//! Chat platform boundary — event shapes and the outbound adapter trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Action id for the "confirm" button on the confirmation prompt.
pub const ACTION_CONFIRM: &str = "confirm_post";
/// Action id for the "decline" button on the confirmation prompt.
pub const ACTION_DECLINE: &str = "decline_post";

/// An inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Author's user id.
    pub user: String,
    /// Message text. Absent for non-text events.
    #[serde(default)]
    pub text: Option<String>,
    /// Message timestamp — doubles as the pending post's correlation id.
    pub ts: String,
    pub channel: String,
    /// Platform subtype (channel joins etc.). Subtyped events carry no
    /// content to act on.
    #[serde(default)]
    pub subtype: Option<String>,
}

/// An inbound interactive button click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Acting user's id.
    pub user: String,
    /// Which button was clicked (`confirm_post` / `decline_post`).
    pub action_id: String,
    /// Correlation id the button was tagged with at prompt time.
    pub value: String,
    pub channel: String,
}

/// An inbound reaction event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// Reacting user's id.
    pub user: String,
    /// Author of the reacted-to message.
    pub item_user: String,
    /// Timestamp of the reacted-to message — matched against the pending
    /// post's correlation id.
    pub item_ts: String,
    pub channel: String,
    /// Emoji name of the reaction.
    pub reaction: String,
}

/// A button rendered on an ephemeral prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ActionButton {
    pub action_id: String,
    pub label: String,
    /// Carried back verbatim in the resulting `ActionEvent`.
    pub value: String,
}

impl ActionButton {
    pub fn new(
        action_id: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Outbound chat delivery — pure I/O, no business logic.
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    /// Send a message visible only to `user` in `channel`, optionally with
    /// interactive buttons.
    async fn post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        text: &str,
        buttons: &[ActionButton],
    ) -> Result<(), ChatError>;

    /// Send a public message to `channel`.
    async fn post(&self, channel: &str, text: &str) -> Result<(), ChatError>;
}
