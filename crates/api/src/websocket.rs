use crate::routes::conversation::MAX_MESSAGE_LENGTH;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use chrono::{DateTime, Utc};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use sre_copilot_core::AssistantCore;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    pub message_type: MessageType,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageType {
    Chat,
    Error,
    Ping,
    Pong,
}

impl WebSocketMessage {
    pub fn new(message_type: MessageType, data: serde_json::Value) -> Self {
        Self {
            message_type,
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MessageType::Error, serde_json::json!({ "error": message.into() }))
    }
}

/// Tracks open chat sockets and answers their messages through the router.
pub struct WebSocketManager {
    connections: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
    core: Arc<AssistantCore>,
}

impl WebSocketManager {
    pub fn new(core: Arc<AssistantCore>) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            core,
        }
    }

    pub async fn handle_socket(&self, socket: WebSocket) {
        let connection_id = Uuid::new_v4();
        self.connections.write().await.insert(connection_id, Utc::now());
        info!("WebSocket connection {} established", connection_id);

        let (mut sender, mut receiver) = socket.split();

        while let Some(msg) = receiver.next().await {
            let reply = match msg {
                Ok(Message::Text(text)) => {
                    debug!("Received WebSocket message: {}", text);
                    self.reply_to(&text).await
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    error!("WebSocket error on {}: {}", connection_id, e);
                    break;
                }
            };

            let json = match serde_json::to_string(&reply) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize WebSocket message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }

        self.connections.write().await.remove(&connection_id);
        info!("WebSocket connection {} closed", connection_id);
    }

    /// Build the reply for one raw text frame. Failures become `Error` frames.
    pub async fn reply_to(&self, text: &str) -> WebSocketMessage {
        let message = match serde_json::from_str::<WebSocketMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to parse WebSocket message: {}", e);
                return WebSocketMessage::error(format!("invalid message: {}", e));
            }
        };

        match message.message_type {
            MessageType::Ping => WebSocketMessage::new(MessageType::Pong, serde_json::json!({})),
            MessageType::Chat => {
                let Some(question) = message.data.as_str() else {
                    return WebSocketMessage::error("chat data must be a string");
                };
                if question.trim().is_empty() {
                    return WebSocketMessage::error("Message cannot be empty");
                }
                if question.len() > MAX_MESSAGE_LENGTH {
                    return WebSocketMessage::error("Message too long");
                }

                match self.core.router.route(question).await {
                    Ok(routed) => WebSocketMessage::new(
                        MessageType::Chat,
                        serde_json::json!({
                            "response": routed.text,
                            "source": routed.source,
                            "intent": routed.intent,
                        }),
                    ),
                    Err(e) => WebSocketMessage::error(e.to_string()),
                }
            }
            other => WebSocketMessage::error(format!("unsupported message type {:?}", other)),
        }
    }

    pub async fn get_active_connections(&self) -> usize {
        self.connections.read().await.len()
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(manager): State<Arc<WebSocketManager>>,
) -> Response {
    ws.on_upgrade(move |socket| async move { manager.handle_socket(socket).await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_core;

    fn manager() -> WebSocketManager {
        WebSocketManager::new(test_core())
    }

    #[tokio::test]
    async fn test_ping_gets_pong() {
        let reply = manager().reply_to(r#"{"message_type":"Ping"}"#).await;
        assert_eq!(reply.message_type, MessageType::Pong);
    }

    #[tokio::test]
    async fn test_chat_gets_local_answer() {
        let reply = manager()
            .reply_to(r#"{"message_type":"Chat","data":"How do I set an SLO?"}"#)
            .await;

        assert_eq!(reply.message_type, MessageType::Chat);
        assert_eq!(reply.data["source"], "local");
        assert_eq!(reply.data["intent"]["primary"], "slo");
        assert!(!reply.data["response"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_frames_become_errors() {
        let manager = manager();

        let garbage = manager.reply_to("not json").await;
        assert_eq!(garbage.message_type, MessageType::Error);

        let wrong_data = manager.reply_to(r#"{"message_type":"Chat","data":42}"#).await;
        assert_eq!(wrong_data.message_type, MessageType::Error);

        let blank = manager.reply_to(r#"{"message_type":"Chat","data":"  "}"#).await;
        assert_eq!(blank.message_type, MessageType::Error);
        assert_eq!(blank.data["error"], "Message cannot be empty");
    }

    #[tokio::test]
    async fn test_no_connections_initially() {
        assert_eq!(manager().get_active_connections().await, 0);
    }
}
