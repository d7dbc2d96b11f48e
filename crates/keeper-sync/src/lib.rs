//! # keeper-sync
//!
//! The sync server (spec §4.2) — the core of this system. One authenticated
//! bidirectional session per device, fanning persisted writes out to every
//! other session the same user has open.
//!
//! Protocol: a single upgrade path, a bearer token carried in the `token`
//! header, then a small state machine per connection —
//! `Upgrading → Authenticating → Snapshotting → Live`.

pub mod registry;
pub mod service;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use keeper_common::auth::{self, Claims};
use keeper_common::crypto::EnvelopeKey;
use keeper_common::models::Message as WireMessage;
use keeper_db::{repository::apps, Database};
use registry::{ConnectionRegistry, SharedRegistry};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared sync-server state.
#[derive(Clone)]
pub struct SyncState {
    pub db: Database,
    pub registry: SharedRegistry,
    pub envelope_key: EnvelopeKey,
}

impl SyncState {
    pub fn new(db: Database, envelope_key: EnvelopeKey) -> Self {
        Self {
            db,
            registry: Arc::new(ConnectionRegistry::new()),
            envelope_key,
        }
    }
}

/// Build the sync server's router — a single upgrade path, per spec §6.
pub fn build_router(state: SyncState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(Arc::new(state))
}

/// Errors from token authentication — each maps directly to the spec's
/// 400-and-close behavior.
#[derive(Debug, thiserror::Error)]
enum AuthError {
    #[error("missing token")]
    Missing,
    #[error("invalid token")]
    Invalid,
}

/// Resolve which app signed `token` (via its unverified `app_id` claim),
/// then verify the MAC against that app's secret. See
/// `keeper_common::auth::peek_app_id` for why peeking first is safe.
async fn authenticate(pool: &PgPool, token: &str) -> Result<Claims, AuthError> {
    let app_id = auth::peek_app_id(token).map_err(|_| AuthError::Invalid)?;
    let app = apps::find_by_id(pool, app_id)
        .await
        .map_err(|_| AuthError::Invalid)?;
    let claims = auth::parse(token, &app.secret).map_err(|_| AuthError::Invalid)?;
    if claims.app_id != app_id {
        return Err(AuthError::Invalid);
    }
    Ok(claims)
}

/// `Upgrading` → `Authenticating`: the token is checked before the upgrade
/// completes, so a rejected connection never enters the websocket protocol
/// at all (spec §4.2/§6: "Missing token ⇒ 400. Invalid/expired token ⇒ 400
/// and the channel is closed without reading frames").
async fn ws_handler(
    headers: HeaderMap,
    ws: WebSocketUpgrade,
    State(state): State<Arc<SyncState>>,
) -> Response {
    let token = match headers.get("token").and_then(|v| v.to_str().ok()) {
        Some(t) => t.to_string(),
        None => return StatusCode::BAD_REQUEST.into_response(),
    };

    let claims = match authenticate(&state.db.pool, &token).await {
        Ok(c) => c,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    ws.on_upgrade(move |socket| handle_connection(socket, state, claims.uid))
}

/// `Snapshotting` → `Live` → `Closed`, one full session.
async fn handle_connection(socket: WebSocket, state: Arc<SyncState>, user_id: i64) {
    let session_id = format!("{:016x}", rand::random::<u64>());
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    state
        .registry
        .register(user_id, session_id.clone(), tx)
        .await;

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                break;
            }
        }
    });

    send_snapshot(&state, user_id, &session_id).await;

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => {
                if !handle_frame(&state, user_id, &session_id, &text).await {
                    break;
                }
            }
            // Binary frames are silently discarded, per spec §6.
            Message::Binary(_) => {}
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.registry.remove(user_id, &session_id).await;
    writer.abort();
    tracing::info!(session = %session_id, user_id, "session closed");
}

/// Best-effort initial snapshot. Failures are reported inline but never
/// abort the session (spec §4.2). Goes only to the connecting session —
/// never broadcast to that user's other live sessions.
async fn send_snapshot(state: &Arc<SyncState>, user_id: i64, session_id: &str) {
    let frame = match service::snapshot(&state.db.pool, &state.envelope_key, user_id).await {
        Ok(items) => WireMessage::snapshot(items),
        Err(e) => {
            tracing::error!(session = session_id, user_id, "snapshot failed: {e}");
            WireMessage::error("failed to collect snapshot")
        }
    };
    state
        .registry
        .send_to(user_id, session_id, to_ws_message(&frame))
        .await;
}

fn to_ws_message(frame: &WireMessage) -> Message {
    Message::Text(serde_json::to_string(frame).expect("Message serializes").into())
}

/// One `Live` iteration: parse, validate, persist, fan out. Returns `false`
/// when the session must close.
async fn handle_frame(
    state: &Arc<SyncState>,
    user_id: i64,
    session_id: &str,
    text: &str,
) -> bool {
    let frame: WireMessage = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(_) => return true, // parse error — drop frame, stay Live
    };

    if authenticate(&state.db.pool, &frame.token).await.is_err() {
        let err = WireMessage::error("invalid token");
        state
            .registry
            .send_to(user_id, session_id, to_ws_message(&err))
            .await;
        return false;
    }

    let item = match service::validate(&frame.value) {
        Ok(item) => item,
        Err(_) => return true, // unknown kind — drop frame, stay Live
    };

    if let Err(e) = service::save(&state.db.pool, &state.envelope_key, user_id, &item).await {
        tracing::error!(session = session_id, user_id, "save failed: {e}");
        return true;
    }

    let update = WireMessage::update(serde_json::to_value(&item).expect("Item serializes"));
    state.registry.publish(user_id, to_ws_message(&update)).await;
    true
}
