//! Inbound webhook server.
//!
//! Two routes, mirroring the chat platform's delivery model:
//! - `POST /slack/events` — Events API envelope (`url_verification`
//!   challenge echo; `event_callback` carrying `message` and
//!   `reaction_added` events)
//! - `POST /slack/interactions` — interactivity payloads (`block_actions`)
//!
//! Handlers ack immediately and run the pipeline on a spawned task, so a
//! slow adapter call never stalls event delivery.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapters::{ActionEvent, MessageEvent, ReactionEvent};
use crate::dispatch::Dispatcher;

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
}

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/slack/events", post(handle_event))
        .route("/slack/interactions", post(handle_interaction))
        .with_state(AppState { dispatcher })
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventEnvelope {
    UrlVerification { challenge: String },
    EventCallback { event: serde_json::Value },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CallbackEvent {
    Message(MessageEvent),
    ReactionAdded(ReactionPayload),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ReactionPayload {
    user: String,
    reaction: String,
    item_user: String,
    item: ReactionItem,
}

#[derive(Debug, Deserialize)]
struct ReactionItem {
    channel: String,
    ts: String,
}

impl From<ReactionPayload> for ReactionEvent {
    fn from(p: ReactionPayload) -> Self {
        Self {
            user: p.user,
            item_user: p.item_user,
            item_ts: p.item.ts,
            channel: p.item.channel,
            reaction: p.reaction,
        }
    }
}

async fn handle_event(State(state): State<AppState>, Json(envelope): Json<EventEnvelope>) -> Response {
    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            Json(serde_json::json!({ "challenge": challenge })).into_response()
        }
        EventEnvelope::EventCallback { event } => {
            match serde_json::from_value::<CallbackEvent>(event) {
                Ok(CallbackEvent::Message(message)) => {
                    let dispatcher = state.dispatcher.clone();
                    tokio::spawn(async move {
                        dispatcher.handle_message(message).await;
                    });
                }
                Ok(CallbackEvent::ReactionAdded(payload)) => {
                    let dispatcher = state.dispatcher.clone();
                    tokio::spawn(async move {
                        dispatcher.handle_reaction(payload.into()).await;
                    });
                }
                Ok(CallbackEvent::Other) => debug!("Ignoring unhandled event type"),
                Err(e) => warn!(error = %e, "Could not parse event callback"),
            }
            StatusCode::OK.into_response()
        }
        EventEnvelope::Other => StatusCode::OK.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct InteractionForm {
    payload: String,
}

#[derive(Debug, Deserialize)]
struct InteractionPayload {
    user: PayloadUser,
    channel: PayloadChannel,
    #[serde(default)]
    actions: Vec<PayloadAction>,
}

#[derive(Debug, Deserialize)]
struct PayloadUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PayloadChannel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PayloadAction {
    action_id: String,
    #[serde(default)]
    value: String,
}

async fn handle_interaction(
    State(state): State<AppState>,
    Form(form): Form<InteractionForm>,
) -> StatusCode {
    let payload: InteractionPayload = match serde_json::from_str(&form.payload) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Could not parse interaction payload");
            return StatusCode::OK;
        }
    };
    let Some(action) = payload.actions.into_iter().next() else {
        debug!("Interaction carried no actions");
        return StatusCode::OK;
    };
    let event = ActionEvent {
        user: payload.user.id,
        action_id: action.action_id,
        value: action.value,
        channel: payload.channel.id,
    };
    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.handle_action(event).await;
    });
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ActionButton, ChatAdapter, SocialAdapter};
    use crate::config::AppConfig;
    use crate::error::{ChatError, SocialError};
    use crate::store::PendingPostStore;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct NullChat;

    #[async_trait]
    impl ChatAdapter for NullChat {
        async fn post_ephemeral(
            &self,
            _channel: &str,
            _user: &str,
            _text: &str,
            _buttons: &[ActionButton],
        ) -> Result<(), ChatError> {
            Ok(())
        }

        async fn post(&self, _channel: &str, _text: &str) -> Result<(), ChatError> {
            Ok(())
        }
    }

    struct NullSocial;

    #[async_trait]
    impl SocialAdapter for NullSocial {
        async fn publish(&self, _text: &str) -> Result<(), SocialError> {
            Ok(())
        }

        async fn publish_with_attachment(
            &self,
            _text: &str,
            _url: &str,
        ) -> Result<(), SocialError> {
            Ok(())
        }

        async fn repost(&self, _id: &str) -> Result<(), SocialError> {
            Ok(())
        }
    }

    fn test_router() -> Router {
        let dispatcher = Arc::new(Dispatcher::new(
            &AppConfig::default(),
            Arc::new(PendingPostStore::new()),
            Arc::new(NullChat),
            Arc::new(NullSocial),
        ));
        router(dispatcher)
    }

    #[tokio::test]
    async fn url_verification_echoes_challenge() {
        let body = serde_json::json!({
            "type": "url_verification",
            "challenge": "abc123"
        });
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/slack/events")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["challenge"], "abc123");
    }

    #[tokio::test]
    async fn event_callback_acks() {
        let body = serde_json::json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "user": "U1",
                "text": "hello",
                "ts": "1.0",
                "channel": "C1"
            }
        });
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/slack/events")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn interaction_payload_acks() {
        let payload = serde_json::json!({
            "type": "block_actions",
            "user": { "id": "U1" },
            "channel": { "id": "C1" },
            "actions": [{ "action_id": "confirm_post", "value": "1.0" }]
        });
        let form = format!(
            "payload={}",
            urlencode(&payload.to_string())
        );
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/slack/interactions")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(form))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Minimal percent-encoding for the form body in tests.
    fn urlencode(raw: &str) -> String {
        let mut out = String::new();
        for b in raw.bytes() {
            match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    out.push(b as char)
                }
                _ => out.push_str(&format!("%{b:02X}")),
            }
        }
        out
    }
}
