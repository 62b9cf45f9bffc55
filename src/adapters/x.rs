//! X social adapter — v2 API over HTTPS.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::adapters::social::SocialAdapter;
use crate::config::XConfig;
use crate::error::SocialError;
use crate::publish;

pub struct XSocial {
    bearer_token: SecretString,
    user_id: String,
    client: reqwest::Client,
}

impl XSocial {
    pub fn new(config: XConfig) -> Self {
        Self {
            bearer_token: config.bearer_token,
            user_id: config.user_id,
            client: reqwest::Client::new(),
        }
    }

    async fn call(&self, url: &str, body: serde_json::Value) -> Result<(), SocialError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.bearer_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| SocialError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(url = %url, "X call succeeded");
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(SocialError::PublishFailed {
                reason: format!("{status}: {detail}"),
            })
        }
    }
}

#[async_trait]
impl SocialAdapter for XSocial {
    async fn publish(&self, text: &str) -> Result<(), SocialError> {
        self.call(
            "https://api.x.com/2/tweets",
            serde_json::json!({ "text": text }),
        )
        .await
    }

    async fn publish_with_attachment(&self, text: &str, url: &str) -> Result<(), SocialError> {
        // The v2 API attaches quotes by id, not by URL.
        let body = match publish::status_id(url) {
            Some(id) => serde_json::json!({ "text": text, "quote_tweet_id": id }),
            None => serde_json::json!({ "text": format!("{text} {url}") }),
        };
        self.call("https://api.x.com/2/tweets", body).await
    }

    async fn repost(&self, id: &str) -> Result<(), SocialError> {
        let url = format!("https://api.x.com/2/users/{}/retweets", self.user_id);
        self.call(&url, serde_json::json!({ "tweet_id": id }))
            .await
            .map_err(|e| SocialError::RepostFailed {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }
}
