//! WebSocket transport for the notifier. Frames are JSON `{"event": ..., "data": ...}`.
//!
//! One writer task drains the connection's channel into the socket; the read loop
//! handles client events until the socket closes, then the registration is dropped.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use eka_core::{ClientEvent, ConnectionId, Room, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Authenticate during the handshake instead of with a later `authenticate` frame.
    #[serde(default)]
    pub token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params.token))
}

async fn handle_socket(socket: WebSocket, state: AppState, token: Option<String>) {
    let (conn, mut rx) = state.notifier.connect();
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping unserializable event");
                    continue;
                }
            };
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    if let Some(token) = token {
        state.notifier.authenticate(&conn, &token, &state.auth).await;
    }

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => handle_frame(&state, &conn, &text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.notifier.disconnect(&conn);
    writer.abort();
}

async fn handle_frame(state: &AppState, conn: &ConnectionId, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::Authenticate { token }) => {
            state.notifier.authenticate(conn, &token, &state.auth).await;
        }
        Ok(ClientEvent::SubscribePipeline { question_id }) => {
            state.notifier.subscribe(conn, Room::Question(question_id));
        }
        Ok(ClientEvent::SubscribeStation { station_id }) => {
            state.notifier.subscribe(conn, Room::Station(station_id));
        }
        Err(e) => {
            tracing::debug!(connection_id = %conn, error = %e, "unrecognized frame");
            state.notifier.send(
                conn,
                ServerEvent::Error {
                    message: format!("unrecognized event: {}", e),
                },
            );
        }
    }
}
