//! Approval pipeline — reaction event → counter increment → publish at quorum.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::{ChatAdapter, ReactionEvent, SocialAdapter};
use crate::config::AppConfig;
use crate::error::Error;
use crate::pipeline::executor::{Pipeline, Stage, StageOutcome};
use crate::publish::PublishPost;
use crate::store::{PendingPost, PendingPostStore, ReactionOutcome};

pub struct ApprovalContext {
    pub reaction: ReactionEvent,
    /// Snapshot taken when the reaction was counted.
    pub post: Option<PendingPost>,
    pub count: u32,
}

impl ApprovalContext {
    pub fn new(reaction: ReactionEvent) -> Self {
        Self {
            reaction,
            post: None,
            count: 0,
        }
    }
}

/// Runs the full reaction guard chain (pending, matching id, confirmed,
/// not yet published, not a self-reaction) and increments the counter in
/// one atomic store operation. Each rejection halts with its own reason.
pub struct RecordReaction {
    store: Arc<PendingPostStore>,
    allow_self: bool,
}

#[async_trait]
impl Stage<ApprovalContext> for RecordReaction {
    fn name(&self) -> &'static str {
        "record_reaction"
    }

    async fn run(&self, mut ctx: ApprovalContext) -> Result<StageOutcome<ApprovalContext>, Error> {
        let r = &ctx.reaction;
        let outcome = self
            .store
            .record_reaction(&r.item_user, &r.item_ts, &r.user, self.allow_self)
            .await;
        match outcome {
            ReactionOutcome::Counted { count, post } => {
                ctx.count = count;
                ctx.post = Some(post);
                Ok(StageOutcome::Continue(ctx))
            }
            ReactionOutcome::NotFound => {
                debug!(author = %r.item_user, "No pending post for reaction");
                Ok(StageOutcome::Halt)
            }
            ReactionOutcome::StaleId => {
                debug!(author = %r.item_user, ts = %r.item_ts, "Reaction targets a stale post");
                Ok(StageOutcome::Halt)
            }
            ReactionOutcome::NotConfirmed => {
                debug!(author = %r.item_user, "Pending post not confirmed yet");
                Ok(StageOutcome::Halt)
            }
            ReactionOutcome::AlreadyPublished => {
                debug!(author = %r.item_user, "Pending post already published");
                Ok(StageOutcome::Halt)
            }
            ReactionOutcome::SelfReaction => {
                info!(user = %r.user, "Self-reaction rejected");
                Ok(StageOutcome::Halt)
            }
        }
    }
}

/// Halts below the quorum threshold. Normal, expected early termination.
pub struct ThresholdGate {
    threshold: u32,
}

#[async_trait]
impl Stage<ApprovalContext> for ThresholdGate {
    fn name(&self) -> &'static str {
        "threshold_gate"
    }

    async fn run(&self, ctx: ApprovalContext) -> Result<StageOutcome<ApprovalContext>, Error> {
        if ctx.count < self.threshold {
            debug!(
                count = ctx.count,
                threshold = self.threshold,
                "Below quorum, waiting for more reactions"
            );
            return Ok(StageOutcome::Halt);
        }
        info!(count = ctx.count, "Quorum reached");
        Ok(StageOutcome::Continue(ctx))
    }
}

/// Build the approval pipeline.
pub fn approval_pipeline(
    config: &AppConfig,
    store: Arc<PendingPostStore>,
    chat: Arc<dyn ChatAdapter>,
    social: Arc<dyn SocialAdapter>,
) -> Pipeline<ApprovalContext> {
    Pipeline::new("approve")
        .stage(RecordReaction {
            store: store.clone(),
            allow_self: config.allow_self_approval,
        })
        .stage(ThresholdGate {
            threshold: config.reaction_threshold,
        })
        .stage(PublishPost {
            store,
            chat,
            social,
        })
}
