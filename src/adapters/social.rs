//! Social platform boundary — the publishing adapter trait.

use async_trait::async_trait;

use crate::error::SocialError;

/// Outbound publishing — pure I/O, no business logic. Which of the three
/// calls fires is decided by the publish-intent classifier.
#[async_trait]
pub trait SocialAdapter: Send + Sync {
    /// Publish `text` as a plain post.
    async fn publish(&self, text: &str) -> Result<(), SocialError>;

    /// Publish `text` quoting the post behind `url`.
    async fn publish_with_attachment(&self, text: &str, url: &str) -> Result<(), SocialError>;

    /// Repost an existing post by id.
    async fn repost(&self, id: &str) -> Result<(), SocialError>;
}
