//! Publish-intent classification and the publish stage.
//!
//! Before the external call, the post content is classified: content that
//! is exactly a recognized status permalink becomes a repost-by-id; content
//! ending with one becomes a quote-post with the link stripped from the
//! text; everything else is published as-is.

use std::sync::Arc;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{error, info, warn};

use crate::adapters::{ChatAdapter, SocialAdapter};
use crate::error::Error;
use crate::pipeline::approve::ApprovalContext;
use crate::pipeline::executor::{Stage, StageOutcome};
use crate::store::PendingPostStore;

// The normalizer strips URL schemes when unwrapping brackets, so the
// scheme is optional here.
static STATUS_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:twitter\.com|x\.com)/[A-Za-z0-9_]+/status(?:es)?/(\d+)")
        .expect("status permalink regex")
});

/// How a post's content should reach the social platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishIntent {
    /// Content is exactly a status permalink — repost it by id.
    Repost { id: String },
    /// Content ends with a status permalink — quote it, with the link
    /// stripped from the text portion.
    Quote { text: String, url: String },
    /// Plain publish of the full content.
    Plain { text: String },
}

impl PublishIntent {
    pub fn classify(content: &str) -> Self {
        let trimmed = content.trim();
        for caps in STATUS_LINK_RE.captures_iter(trimmed) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.end() != trimmed.len() {
                continue;
            }
            if whole.start() == 0 {
                return Self::Repost {
                    id: caps[1].to_string(),
                };
            }
            return Self::Quote {
                text: trimmed[..whole.start()].trim_end().to_string(),
                url: whole.as_str().to_string(),
            };
        }
        Self::Plain {
            text: content.to_string(),
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Repost { .. } => "repost",
            Self::Quote { .. } => "quote",
            Self::Plain { .. } => "plain",
        }
    }
}

/// Whether the text contains a recognized status permalink anywhere.
pub fn contains_status_link(text: &str) -> bool {
    STATUS_LINK_RE.is_match(text)
}

/// Extract the status id from a permalink, if it is one.
pub fn status_id(url: &str) -> Option<String> {
    STATUS_LINK_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Terminal approval stage: notify the author, attempt the publish call,
/// and mark the post published regardless of the call's outcome.
pub struct PublishPost {
    pub(crate) store: Arc<PendingPostStore>,
    pub(crate) chat: Arc<dyn ChatAdapter>,
    pub(crate) social: Arc<dyn SocialAdapter>,
}

#[async_trait]
impl Stage<ApprovalContext> for PublishPost {
    fn name(&self) -> &'static str {
        "publish_post"
    }

    async fn run(&self, mut ctx: ApprovalContext) -> Result<StageOutcome<ApprovalContext>, Error> {
        let Some(post) = ctx.post.take() else {
            return Ok(StageOutcome::Halt);
        };
        let author = &ctx.reaction.item_user;

        // Best-effort acknowledgment before the attempt.
        if let Err(e) = self
            .chat
            .post_ephemeral(&post.channel, author, "Quorum reached — publishing now!", &[])
            .await
        {
            warn!(user = %author, error = %e, "Could not send publishing notice");
        }

        let intent = PublishIntent::classify(&post.content);
        info!(user = %author, intent = %intent.label(), "Publishing pending post");

        let result = match &intent {
            PublishIntent::Repost { id } => self.social.repost(id).await,
            PublishIntent::Quote { text, url } => {
                self.social.publish_with_attachment(text, url).await
            }
            PublishIntent::Plain { text } => self.social.publish(text).await,
        };

        match result {
            Ok(()) => info!(user = %author, "Publish call succeeded"),
            Err(e) => error!(user = %author, error = %e, "Publish call failed"),
        }

        // Marked after the attempt, success or not. There is no retry path.
        self.store.mark_published(author).await;

        Ok(StageOutcome::Continue(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_permalink_is_repost() {
        let intent = PublishIntent::classify("https://twitter.com/alice/status/12345");
        assert_eq!(intent, PublishIntent::Repost { id: "12345".into() });
    }

    #[test]
    fn schemeless_permalink_is_repost() {
        let intent = PublishIntent::classify("x.com/alice/status/999");
        assert_eq!(intent, PublishIntent::Repost { id: "999".into() });
    }

    #[test]
    fn surrounding_whitespace_still_exact() {
        let intent = PublishIntent::classify("  https://x.com/bob/statuses/42  \n");
        assert_eq!(intent, PublishIntent::Repost { id: "42".into() });
    }

    #[test]
    fn trailing_permalink_is_quote() {
        let intent = PublishIntent::classify("check this out twitter.com/bob/status/777");
        assert_eq!(
            intent,
            PublishIntent::Quote {
                text: "check this out".into(),
                url: "twitter.com/bob/status/777".into(),
            }
        );
    }

    #[test]
    fn leading_permalink_is_plain() {
        let content = "twitter.com/bob/status/777 is worth a read";
        let intent = PublishIntent::classify(content);
        assert_eq!(intent, PublishIntent::Plain { text: content.into() });
    }

    #[test]
    fn no_permalink_is_plain() {
        let intent = PublishIntent::classify("just some words");
        assert_eq!(
            intent,
            PublishIntent::Plain { text: "just some words".into() }
        );
    }

    #[test]
    fn last_of_several_permalinks_wins_for_quote() {
        let intent =
            PublishIntent::classify("x.com/a/status/1 vs x.com/b/status/2");
        assert_eq!(
            intent,
            PublishIntent::Quote {
                text: "x.com/a/status/1 vs".into(),
                url: "x.com/b/status/2".into(),
            }
        );
    }

    #[test]
    fn status_id_extraction() {
        assert_eq!(
            status_id("https://x.com/alice/status/555"),
            Some("555".into())
        );
        assert_eq!(status_id("https://example.com/not/a/status"), None);
    }

    #[test]
    fn link_detection() {
        assert!(contains_status_link("fyi x.com/a/status/1 thanks"));
        assert!(!contains_status_link("no links here"));
    }
}
