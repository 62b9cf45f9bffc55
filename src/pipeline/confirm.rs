//! Confirmation pipeline — button click → confirmed or cancelled post.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::{ActionEvent, ChatAdapter, ACTION_DECLINE};
use crate::config::AppConfig;
use crate::error::Error;
use crate::pipeline::executor::{Pipeline, Stage, StageOutcome};
use crate::store::{ConfirmOutcome, PendingPost, PendingPostStore};

pub struct ConfirmContext {
    pub action: ActionEvent,
    /// Set by the lookup stage for the correlation check.
    pub post: Option<PendingPost>,
}

impl ConfirmContext {
    pub fn new(action: ActionEvent) -> Self {
        Self { action, post: None }
    }
}

/// Handles the decline button: notify the author, optionally drop the
/// pending post, and halt either way.
pub struct HandleDecline {
    store: Arc<PendingPostStore>,
    chat: Arc<dyn ChatAdapter>,
    delete_on_decline: bool,
}

#[async_trait]
impl Stage<ConfirmContext> for HandleDecline {
    fn name(&self) -> &'static str {
        "handle_decline"
    }

    async fn run(&self, ctx: ConfirmContext) -> Result<StageOutcome<ConfirmContext>, Error> {
        if ctx.action.action_id != ACTION_DECLINE {
            return Ok(StageOutcome::Continue(ctx));
        }
        let user = &ctx.action.user;
        if self.delete_on_decline {
            self.store.remove(user).await;
        } else {
            info!(user = %user, "Post declined, left until overwritten");
        }
        self.chat
            .post_ephemeral(&ctx.action.channel, user, "Okay, I won't post it.", &[])
            .await?;
        Ok(StageOutcome::Halt)
    }
}

/// Requires a pending post to exist for the acting user.
pub struct RequirePending {
    store: Arc<PendingPostStore>,
    chat: Arc<dyn ChatAdapter>,
}

#[async_trait]
impl Stage<ConfirmContext> for RequirePending {
    fn name(&self) -> &'static str {
        "require_pending"
    }

    async fn run(&self, mut ctx: ConfirmContext) -> Result<StageOutcome<ConfirmContext>, Error> {
        match self.store.get(&ctx.action.user).await {
            Some(post) => {
                ctx.post = Some(post);
                Ok(StageOutcome::Continue(ctx))
            }
            None => {
                debug!(user = %ctx.action.user, "No pending post to confirm");
                self.chat
                    .post_ephemeral(
                        &ctx.action.channel,
                        &ctx.action.user,
                        "I couldn't find a pending post for you.",
                        &[],
                    )
                    .await?;
                Ok(StageOutcome::Halt)
            }
        }
    }
}

/// Requires the action's embedded correlation id to match the stored post.
pub struct MatchCorrelation {
    chat: Arc<dyn ChatAdapter>,
}

#[async_trait]
impl Stage<ConfirmContext> for MatchCorrelation {
    fn name(&self) -> &'static str {
        "match_correlation"
    }

    async fn run(&self, ctx: ConfirmContext) -> Result<StageOutcome<ConfirmContext>, Error> {
        let Some(post) = &ctx.post else {
            return Ok(StageOutcome::Halt);
        };
        if post.id != ctx.action.value {
            info!(
                user = %ctx.action.user,
                held = %post.id,
                got = %ctx.action.value,
                "Stale confirmation"
            );
            self.chat
                .post_ephemeral(
                    &ctx.action.channel,
                    &ctx.action.user,
                    "That confirmation is stale — the pending post has changed.",
                    &[],
                )
                .await?;
            return Ok(StageOutcome::Halt);
        }
        Ok(StageOutcome::Continue(ctx))
    }
}

/// Marks the post confirmed and posts a public recruitment message naming
/// the reaction threshold.
pub struct MarkConfirmed {
    store: Arc<PendingPostStore>,
    chat: Arc<dyn ChatAdapter>,
    threshold: u32,
}

#[async_trait]
impl Stage<ConfirmContext> for MarkConfirmed {
    fn name(&self) -> &'static str {
        "mark_confirmed"
    }

    async fn run(&self, ctx: ConfirmContext) -> Result<StageOutcome<ConfirmContext>, Error> {
        match self.store.confirm(&ctx.action.user, &ctx.action.value).await {
            ConfirmOutcome::Confirmed(post) => {
                let announcement = format!(
                    "<@{}> wants to publish:\n>{}\nReact to this if you're in — {} reactions and it goes out!",
                    ctx.action.user, post.content, self.threshold
                );
                self.chat.post(&ctx.action.channel, &announcement).await?;
                Ok(StageOutcome::Continue(ctx))
            }
            ConfirmOutcome::NotFound | ConfirmOutcome::StaleId => {
                // The post changed between the lookup stage and here.
                debug!(user = %ctx.action.user, "Pending post changed mid-confirmation");
                Ok(StageOutcome::Halt)
            }
        }
    }
}

/// Build the confirmation pipeline.
pub fn confirm_pipeline(
    config: &AppConfig,
    store: Arc<PendingPostStore>,
    chat: Arc<dyn ChatAdapter>,
) -> Pipeline<ConfirmContext> {
    Pipeline::new("confirm")
        .stage(HandleDecline {
            store: store.clone(),
            chat: chat.clone(),
            delete_on_decline: config.delete_on_decline,
        })
        .stage(RequirePending {
            store: store.clone(),
            chat: chat.clone(),
        })
        .stage(MatchCorrelation { chat: chat.clone() })
        .stage(MarkConfirmed {
            store,
            chat,
            threshold: config.reaction_threshold,
        })
}
