//! Real-time notifier: registry of live connections, their bound user and room
//! memberships. Transport-agnostic; the gateway drives it from WebSocket frames.
//!
//! Delivery is best-effort. Each connection owns a bounded channel; a full or closed
//! channel drops the event for that connection only.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::auth::AuthService;
use crate::model::StepName;

pub type ConnectionId = String;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    Question(String),
    Station(String),
}

impl Room {
    pub fn key(&self) -> String {
        match self {
            Room::Question(id) => format!("question:{}", id),
            Room::Station(id) => format!("station:{}", id),
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Frames sent to clients: `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        connection_id: ConnectionId,
        message: String,
    },
    Authenticated {
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Subscribed {
        room: String,
    },
    Error {
        message: String,
    },
    Notification(Value),
    PipelineUpdate {
        question_id: String,
        step: StepName,
        data: Value,
    },
    StationAlert(Value),
}

/// Frames accepted from clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Authenticate { token: String },
    SubscribePipeline { question_id: String },
    SubscribeStation { station_id: String },
}

struct Connection {
    user_id: Option<String>,
    rooms: HashSet<Room>,
    tx: mpsc::Sender<ServerEvent>,
}

/// Cloneable handle; clones share one registry.
#[derive(Clone, Default)]
pub struct Notifier {
    connections: Arc<DashMap<ConnectionId, Connection>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and queue its `connected` greeting.
    pub fn connect(&self) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let _ = tx.try_send(ServerEvent::Connected {
            connection_id: id.clone(),
            message: "Connected to EKA-AI real-time service".to_string(),
        });
        self.connections.insert(
            id.clone(),
            Connection {
                user_id: None,
                rooms: HashSet::new(),
                tx,
            },
        );
        tracing::info!(connection_id = %id, "client connected");
        (id, rx)
    }

    pub fn bind_user(&self, conn: &str, user_id: &str) -> bool {
        match self.connections.get_mut(conn) {
            Some(mut entry) => {
                entry.user_id = Some(user_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Validate `token` and bind the connection to its user. A failure is reported to
    /// the client and the connection stays open, unbound.
    pub async fn authenticate(&self, conn: &str, token: &str, auth: &AuthService) -> bool {
        match auth.authenticate(token).await {
            Ok(user) => {
                if !self.bind_user(conn, &user.id) {
                    return false;
                }
                tracing::info!(connection_id = %conn, user_id = %user.id, "connection authenticated");
                self.send(
                    conn,
                    ServerEvent::Authenticated {
                        status: "success".to_string(),
                        user_id: Some(user.id),
                        message: None,
                    },
                );
                true
            }
            Err(e) => {
                tracing::debug!(connection_id = %conn, error = %e, "connection authentication failed");
                self.send(
                    conn,
                    ServerEvent::Authenticated {
                        status: "error".to_string(),
                        user_id: None,
                        message: Some("Invalid token".to_string()),
                    },
                );
                false
            }
        }
    }

    /// Join a room. Joining twice is a no-op apart from the repeated acknowledgement.
    pub fn subscribe(&self, conn: &str, room: Room) -> bool {
        let key = room.key();
        let joined = match self.connections.get_mut(conn) {
            Some(mut entry) => {
                entry.rooms.insert(room);
                true
            }
            None => false,
        };
        if joined {
            tracing::debug!(connection_id = %conn, room = %key, "subscribed");
            self.send(conn, ServerEvent::Subscribed { room: key });
        }
        joined
    }

    pub fn disconnect(&self, conn: &str) -> bool {
        let removed = self.connections.remove(conn).is_some();
        if removed {
            tracing::info!(connection_id = %conn, "client disconnected");
        }
        removed
    }

    pub fn send(&self, conn: &str, event: ServerEvent) -> bool {
        self.connections
            .get(conn)
            .map(|entry| entry.tx.try_send(event).is_ok())
            .unwrap_or(false)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn user_of(&self, conn: &str) -> Option<String> {
        self.connections.get(conn).and_then(|e| e.user_id.clone())
    }

    pub fn is_subscribed(&self, conn: &str, room: &Room) -> bool {
        self.connections
            .get(conn)
            .map(|e| e.rooms.contains(room))
            .unwrap_or(false)
    }

    /// To subscribers of `question:{question_id}` only.
    pub fn emit_pipeline_update(&self, question_id: &str, step: StepName, data: Value) -> usize {
        let room = Room::Question(question_id.to_string());
        let event = ServerEvent::PipelineUpdate {
            question_id: question_id.to_string(),
            step,
            data,
        };
        self.deliver(event, |c| c.rooms.contains(&room))
    }

    /// To every connection bound to `user_id`.
    pub fn emit_notification(&self, user_id: &str, payload: Value) -> usize {
        self.deliver(ServerEvent::Notification(payload), |c| {
            c.user_id.as_deref() == Some(user_id)
        })
    }

    /// To every connection.
    pub fn emit_station_alert(&self, payload: Value) -> usize {
        self.deliver(ServerEvent::StationAlert(payload), |_| true)
    }

    fn deliver<F>(&self, event: ServerEvent, wanted: F) -> usize
    where
        F: Fn(&Connection) -> bool,
    {
        self.connections
            .iter()
            .filter(|entry| wanted(entry.value()))
            .filter(|entry| entry.value().tx.try_send(event.clone()).is_ok())
            .count()
    }
}
