//! Pending-post store — per-user mutable state behind one lock.
//!
//! At most one pending post per user id. A new qualifying message replaces
//! any existing post for that user (no merge, no rejection). Compound
//! operations take the write lock for their full read-modify-write span,
//! so confirmations and reaction counting are atomic; between separate
//! pipeline stages the state may still be replaced by a concurrent ingest
//! for the same user.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// The single in-flight, not-yet-published candidate post for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPost {
    /// Correlation id — the originating message's timestamp. Confirmations
    /// and reactions carrying a different id are rejected as stale.
    pub id: String,
    /// Normalized text to publish.
    pub content: String,
    /// Channel the prompt and recruitment messages go to.
    pub channel: String,
    pub queued_at: DateTime<Utc>,
    /// Advisory expiry. No stage checks this before publish.
    pub expires_at: DateTime<Utc>,
    /// Set by the confirmation pipeline.
    pub confirmed: bool,
    /// Incremented per qualifying reaction, reset only by replacement.
    pub reaction_count: u32,
    /// Set once a publish attempt has been made, even if the call failed.
    pub published: bool,
}

impl PendingPost {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        channel: impl Into<String>,
        expiry: std::time::Duration,
    ) -> Self {
        let now = Utc::now();
        let expiry = chrono::Duration::from_std(expiry)
            .unwrap_or_else(|_| chrono::Duration::seconds(900));
        Self {
            id: id.into(),
            content: content.into(),
            channel: channel.into(),
            queued_at: now,
            expires_at: now + expiry,
            confirmed: false,
            reaction_count: 0,
            published: false,
        }
    }

    /// Advisory only — nothing gates on this before publish.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Outcome of a confirmation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    Confirmed(PendingPost),
    /// No pending post for the acting user.
    NotFound,
    /// The pending post's id no longer matches the confirmation's.
    StaleId,
}

/// Outcome of recording a reaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionOutcome {
    Counted { count: u32, post: PendingPost },
    NotFound,
    StaleId,
    /// The post exists but was never confirmed.
    NotConfirmed,
    AlreadyPublished,
    /// The reactor is the post's author and the debug override is off.
    SelfReaction,
}

/// Keyed store holding at most one pending post per user.
#[derive(Default)]
pub struct PendingPostStore {
    posts: RwLock<HashMap<String, PendingPost>>,
}

impl PendingPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new pending post for the user, replacing any prior one.
    /// Returns the replaced post, if any.
    pub async fn replace(&self, user: &str, post: PendingPost) -> Option<PendingPost> {
        info!(user = %user, id = %post.id, "Queued pending post");
        self.posts.write().await.insert(user.to_string(), post)
    }

    pub async fn get(&self, user: &str) -> Option<PendingPost> {
        self.posts.read().await.get(user).cloned()
    }

    pub async fn remove(&self, user: &str) -> Option<PendingPost> {
        let removed = self.posts.write().await.remove(user);
        if removed.is_some() {
            info!(user = %user, "Removed pending post");
        }
        removed
    }

    /// Queue time of the user's most recent pending post. This is what the
    /// rate limiter compares against — there is no separate accepted
    /// ledger, so a refused user can retry once the previous pending post
    /// ages past the window.
    pub async fn last_queued_at(&self, user: &str) -> Option<DateTime<Utc>> {
        self.posts.read().await.get(user).map(|p| p.queued_at)
    }

    /// Mark the user's pending post confirmed if the correlation id matches.
    pub async fn confirm(&self, user: &str, id: &str) -> ConfirmOutcome {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(user) else {
            return ConfirmOutcome::NotFound;
        };
        if post.id != id {
            return ConfirmOutcome::StaleId;
        }
        post.confirmed = true;
        info!(user = %user, id = %id, "Pending post confirmed");
        ConfirmOutcome::Confirmed(post.clone())
    }

    /// Record one reaction against the author's pending post. The full
    /// guard chain and the increment run under one write guard.
    pub async fn record_reaction(
        &self,
        author: &str,
        id: &str,
        reactor: &str,
        allow_self: bool,
    ) -> ReactionOutcome {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(author) else {
            return ReactionOutcome::NotFound;
        };
        if post.id != id {
            return ReactionOutcome::StaleId;
        }
        if !post.confirmed {
            return ReactionOutcome::NotConfirmed;
        }
        if post.published {
            return ReactionOutcome::AlreadyPublished;
        }
        if reactor == author && !allow_self {
            return ReactionOutcome::SelfReaction;
        }
        post.reaction_count += 1;
        debug!(
            author = %author,
            reactor = %reactor,
            count = post.reaction_count,
            "Reaction counted"
        );
        ReactionOutcome::Counted {
            count: post.reaction_count,
            post: post.clone(),
        }
    }

    /// Mark the user's pending post as published. Returns false when no
    /// post exists (e.g. replaced mid-publish).
    pub async fn mark_published(&self, user: &str) -> bool {
        let mut posts = self.posts.write().await;
        match posts.get_mut(user) {
            Some(post) => {
                post.published = true;
                info!(user = %user, id = %post.id, "Pending post marked published");
                true
            }
            None => false,
        }
    }
}
