//! Slack chat adapter — Web API over HTTPS.
//!
//! Implements `ChatAdapter` with `chat.postMessage` / `chat.postEphemeral`.
//! Inbound events arrive separately through the webhook server.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::adapters::chat::{ActionButton, ChatAdapter};
use crate::config::SlackConfig;
use crate::error::ChatError;

pub struct SlackChat {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl SlackChat {
    pub fn new(config: SlackConfig) -> Self {
        Self {
            bot_token: config.bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://slack.com/api/{method}")
    }

    /// Call a Web API method and map Slack's `ok: false` envelope to an
    /// adapter error.
    async fn call(&self, method: &str, body: serde_json::Value) -> Result<(), ChatError> {
        let response = self
            .client
            .post(self.api_url(method))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Http(e.to_string()))?;

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChatError::Http(e.to_string()))?;

        if envelope.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            debug!(method = %method, "Slack call succeeded");
            Ok(())
        } else {
            let reason = envelope
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();
            Err(ChatError::Api { reason })
        }
    }

    fn button_blocks(text: &str, buttons: &[ActionButton]) -> serde_json::Value {
        let mut blocks = vec![serde_json::json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": text }
        })];
        if !buttons.is_empty() {
            let elements: Vec<serde_json::Value> = buttons
                .iter()
                .map(|b| {
                    serde_json::json!({
                        "type": "button",
                        "text": { "type": "plain_text", "text": b.label },
                        "action_id": b.action_id,
                        "value": b.value,
                    })
                })
                .collect();
            blocks.push(serde_json::json!({ "type": "actions", "elements": elements }));
        }
        serde_json::Value::Array(blocks)
    }
}

#[async_trait]
impl ChatAdapter for SlackChat {
    async fn post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        text: &str,
        buttons: &[ActionButton],
    ) -> Result<(), ChatError> {
        let body = serde_json::json!({
            "channel": channel,
            "user": user,
            "text": text,
            "blocks": Self::button_blocks(text, buttons),
        });
        self.call("chat.postEphemeral", body).await
    }

    async fn post(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        let body = serde_json::json!({
            "channel": channel,
            "text": text,
        });
        self.call("chat.postMessage", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_include_buttons_when_present() {
        let buttons = vec![
            ActionButton::new("confirm_post", "Post it", "1.0"),
            ActionButton::new("decline_post", "Never mind", "1.0"),
        ];
        let blocks = SlackChat::button_blocks("ready?", &buttons);
        let rendered = blocks.to_string();
        assert!(rendered.contains("\"actions\""));
        assert!(rendered.contains("confirm_post"));
        assert!(rendered.contains("decline_post"));
        assert_eq!(blocks.as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn blocks_omit_actions_without_buttons() {
        let blocks = SlackChat::button_blocks("just text", &[]);
        assert_eq!(blocks.as_array().map(|a| a.len()), Some(1));
        assert!(!blocks.to_string().contains("\"actions\""));
    }
}
