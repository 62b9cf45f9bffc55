//! Ingest pipeline — raw chat message → queued pending post → prompt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::{ActionButton, ChatAdapter, MessageEvent, ACTION_CONFIRM, ACTION_DECLINE};
use crate::config::AppConfig;
use crate::error::Error;
use crate::normalize::{self, TextNormalizer};
use crate::pipeline::executor::{Pipeline, Stage, StageOutcome};
use crate::publish;
use crate::store::{PendingPost, PendingPostStore};

pub struct IngestContext {
    pub message: MessageEvent,
    /// Set by the queue stage for the prompt stage.
    pub post: Option<PendingPost>,
}

impl IngestContext {
    pub fn new(message: MessageEvent) -> Self {
        Self {
            message,
            post: None,
        }
    }
}

/// Drops subtyped events (channel joins and the like) — no content to act on.
pub struct FilterSubtypes;

#[async_trait]
impl Stage<IngestContext> for FilterSubtypes {
    fn name(&self) -> &'static str {
        "filter_subtypes"
    }

    async fn run(&self, ctx: IngestContext) -> Result<StageOutcome<IngestContext>, Error> {
        if let Some(subtype) = &ctx.message.subtype {
            debug!(subtype = %subtype, "Ignoring subtyped event");
            return Ok(StageOutcome::Halt);
        }
        Ok(StageOutcome::Continue(ctx))
    }
}

/// Requires the trigger token as a prefix, or a status permalink anywhere
/// in the text. Non-qualifying messages are discarded silently.
pub struct RequireTrigger {
    trigger_token: String,
}

#[async_trait]
impl Stage<IngestContext> for RequireTrigger {
    fn name(&self) -> &'static str {
        "require_trigger"
    }

    async fn run(&self, ctx: IngestContext) -> Result<StageOutcome<IngestContext>, Error> {
        let Some(text) = &ctx.message.text else {
            debug!("Message has no text");
            return Ok(StageOutcome::Halt);
        };
        if text.starts_with(&self.trigger_token) || publish::contains_status_link(text) {
            Ok(StageOutcome::Continue(ctx))
        } else {
            info!(user = %ctx.message.user, "Message does not qualify for publishing");
            Ok(StageOutcome::Halt)
        }
    }
}

/// Halts when the user's most recent pending post is younger than the
/// window. Compares against queue time only — whether that post was ever
/// confirmed or published does not matter.
pub struct RateLimit {
    store: Arc<PendingPostStore>,
    window: Duration,
}

#[async_trait]
impl Stage<IngestContext> for RateLimit {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    async fn run(&self, ctx: IngestContext) -> Result<StageOutcome<IngestContext>, Error> {
        if let Some(last) = self.store.last_queued_at(&ctx.message.user).await {
            let elapsed = chrono::Utc::now()
                .signed_duration_since(last)
                .to_std()
                .unwrap_or_default();
            if elapsed < self.window {
                info!(
                    user = %ctx.message.user,
                    elapsed_secs = elapsed.as_secs(),
                    "Rate limited, discarding message"
                );
                return Ok(StageOutcome::Halt);
            }
        }
        Ok(StageOutcome::Continue(ctx))
    }
}

/// Normalizes the text and stores a new pending post, replacing any prior
/// one for the user.
pub struct QueuePost {
    store: Arc<PendingPostStore>,
    normalizer: TextNormalizer,
    expiry: Duration,
}

#[async_trait]
impl Stage<IngestContext> for QueuePost {
    fn name(&self) -> &'static str {
        "queue_post"
    }

    async fn run(&self, mut ctx: IngestContext) -> Result<StageOutcome<IngestContext>, Error> {
        let Some(content) = self.normalizer.normalize(ctx.message.text.as_deref()) else {
            return Ok(StageOutcome::Halt);
        };
        let post = PendingPost::new(
            ctx.message.ts.clone(),
            content,
            ctx.message.channel.clone(),
            self.expiry,
        );
        if self
            .store
            .replace(&ctx.message.user, post.clone())
            .await
            .is_some()
        {
            debug!(user = %ctx.message.user, "Replaced prior pending post");
        }
        ctx.post = Some(post);
        Ok(StageOutcome::Continue(ctx))
    }
}

/// Sends the author an ephemeral confirmation prompt with confirm/decline
/// buttons tagged with the post's correlation id.
pub struct SendPrompt {
    chat: Arc<dyn ChatAdapter>,
}

#[async_trait]
impl Stage<IngestContext> for SendPrompt {
    fn name(&self) -> &'static str {
        "send_prompt"
    }

    async fn run(&self, ctx: IngestContext) -> Result<StageOutcome<IngestContext>, Error> {
        let Some(post) = &ctx.post else {
            return Ok(StageOutcome::Halt);
        };

        let mut text = format!("You're about to post:\n>{}\nShip it?", post.content);
        if normalize::contains_emoji_shorthand(&post.content) {
            text.push_str("\n_Unrecognized :emoji: codes will be posted as written._");
        }

        let buttons = [
            ActionButton::new(ACTION_CONFIRM, "Post it", post.id.clone()),
            ActionButton::new(ACTION_DECLINE, "Never mind", post.id.clone()),
        ];
        self.chat
            .post_ephemeral(&post.channel, &ctx.message.user, &text, &buttons)
            .await?;
        Ok(StageOutcome::Continue(ctx))
    }
}

/// Build the ingest pipeline.
pub fn ingest_pipeline(
    config: &AppConfig,
    store: Arc<PendingPostStore>,
    chat: Arc<dyn ChatAdapter>,
) -> Pipeline<IngestContext> {
    Pipeline::new("ingest")
        .stage(FilterSubtypes)
        .stage(RequireTrigger {
            trigger_token: config.trigger_token.clone(),
        })
        .stage(RateLimit {
            store: store.clone(),
            window: config.rate_limit,
        })
        .stage(QueuePost {
            store,
            normalizer: TextNormalizer::new(config.trigger_token.clone()),
            expiry: config.pending_expiry,
        })
        .stage(SendPrompt { chat })
}
