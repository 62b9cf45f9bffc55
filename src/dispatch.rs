//! Dispatcher — routes inbound events to their pipelines.
//!
//! The three pipelines are built once at startup and share the store and
//! adapters; each event runs one pipeline invocation.

use std::sync::Arc;

use crate::adapters::{ActionEvent, ChatAdapter, MessageEvent, ReactionEvent, SocialAdapter};
use crate::config::AppConfig;
use crate::pipeline::approve::{approval_pipeline, ApprovalContext};
use crate::pipeline::confirm::{confirm_pipeline, ConfirmContext};
use crate::pipeline::ingest::{ingest_pipeline, IngestContext};
use crate::pipeline::{Pipeline, PipelineRun};
use crate::store::PendingPostStore;

pub struct Dispatcher {
    ingest: Pipeline<IngestContext>,
    confirm: Pipeline<ConfirmContext>,
    approve: Pipeline<ApprovalContext>,
}

impl Dispatcher {
    pub fn new(
        config: &AppConfig,
        store: Arc<PendingPostStore>,
        chat: Arc<dyn ChatAdapter>,
        social: Arc<dyn SocialAdapter>,
    ) -> Self {
        Self {
            ingest: ingest_pipeline(config, store.clone(), chat.clone()),
            confirm: confirm_pipeline(config, store.clone(), chat.clone()),
            approve: approval_pipeline(config, store, chat, social),
        }
    }

    pub async fn handle_message(&self, event: MessageEvent) -> PipelineRun {
        self.ingest.execute(IngestContext::new(event)).await
    }

    pub async fn handle_action(&self, event: ActionEvent) -> PipelineRun {
        self.confirm.execute(ConfirmContext::new(event)).await
    }

    pub async fn handle_reaction(&self, event: ReactionEvent) -> PipelineRun {
        self.approve.execute(ApprovalContext::new(event)).await
    }
}
