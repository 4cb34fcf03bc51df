//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::registry::RegistryError;
use crate::relay::RelayHandle;

/// WebSocket upgrade handler
///
/// Entry point for chat clients. Upgrades the HTTP connection and hands
/// the socket to the relay.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let relay = state.relay.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, relay))
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, relay: RelayHandle) {
    let (mut sender, mut receiver) = socket.split();

    // Outbound queue for this connection; the relay pushes frames into it
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let session_id = match relay.connect(tx.clone()).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Some(frame) = encode(&error_msg) {
                let _ = sender.send(frame).await;
            }
            return;
        }
    };

    // Queued ahead of anything the relay sends
    let _ = tx.send(ServerMessage::Connected {
        session_id: session_id.clone(),
    });

    let session_for_send = session_id.clone();

    // Task to forward frames from the queue to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(frame) = encode(&msg) else {
                continue;
            };
            if sender.send(frame).await.is_err() {
                tracing::debug!(
                    session_id = %session_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let relay_for_recv = relay.clone();
    let session_for_recv = session_id.clone();

    // Task to receive frames from the socket and hand them to the relay
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&relay_for_recv, &tx, &session_for_recv, msg) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    relay.disconnect(&session_id);
}

/// Handle a received WebSocket frame
///
/// Returns false if the connection should be closed.
fn handle_ws_message(
    relay: &RelayHandle,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    session_id: &str,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    tracing::trace!(session_id = %session_id, event = client_msg.name(), "Client event");
                    if relay.dispatch(session_id, client_msg).is_err() {
                        tracing::warn!(session_id = %session_id, "Relay stopped, closing connection");
                        return false;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    // Reply but keep connection open
                    let reply = rejected_ack(&text, &e).unwrap_or_else(|| ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    });
                    let _ = tx.send(reply);
                }
            }
            true
        }
        Message::Binary(_) => {
            let _ = tx.send(ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            });
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(session_id = %session_id, "Client requested close");
            false
        }
    }
}

/// Ack reply for a frame that failed to parse but still carried an ack id
///
/// A `join` missing its username or room gets the same error a blank one
/// would.
fn rejected_ack(text: &str, error: &serde_json::Error) -> Option<ServerMessage> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let ack = value.get("ack")?.as_u64()?;

    let message = if is_incomplete_join(&value) {
        RegistryError::Validation.to_string()
    } else {
        format!("Invalid message format: {}", error)
    };

    Some(ServerMessage::Ack {
        ack,
        error: Some(message),
    })
}

fn is_incomplete_join(value: &serde_json::Value) -> bool {
    let blank = |field: &str| {
        value
            .get(field)
            .and_then(|v| v.as_str())
            .map_or(true, |s| s.trim().is_empty())
    };
    value.get("event").and_then(|e| e.as_str()) == Some("join")
        && (blank("username") || blank("room"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, GatewayConfig};
    use crate::relay::{Relay, RelayConfig};

    async fn connected() -> (RelayHandle, String, mpsc::UnboundedSender<ServerMessage>, mpsc::UnboundedReceiver<ServerMessage>) {
        let relay = RelayHandle::spawn(Relay::new(
            RelayConfig::default(),
            Gateway::new(GatewayConfig::default()),
        ));
        let (tx, rx) = mpsc::unbounded_channel();
        let id = relay.connect(tx.clone()).await.unwrap();
        (relay, id, tx, rx)
    }

    #[tokio::test]
    async fn test_invalid_json_keeps_connection() {
        let (relay, id, tx, mut rx) = connected().await;

        let keep = handle_ws_message(&relay, &tx, &id, Message::Text("not json".to_string()));
        assert!(keep);

        match rx.recv().await.unwrap() {
            ServerMessage::Error { message } => assert!(message.starts_with("Invalid message format")),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_join_missing_room_is_acked() {
        let (relay, id, tx, mut rx) = connected().await;

        let frame = r#"{"event":"join","username":"Alice","ack":1}"#;
        assert!(handle_ws_message(&relay, &tx, &id, Message::Text(frame.to_string())));

        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::Ack {
                ack: 1,
                error: Some("Username and room are required!".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_event_with_ack_is_acked() {
        let (relay, id, tx, mut rx) = connected().await;

        let frame = r#"{"event":"sendLocation","latitude":"north","ack":4}"#;
        assert!(handle_ws_message(&relay, &tx, &id, Message::Text(frame.to_string())));

        match rx.recv().await.unwrap() {
            ServerMessage::Ack {
                ack: 4,
                error: Some(message),
            } => assert!(message.starts_with("Invalid message format")),
            other => panic!("Expected Ack, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_event_without_ack_gets_error() {
        let (relay, id, tx, mut rx) = connected().await;

        let frame = r#"{"event":"shout","text":"hi"}"#;
        assert!(handle_ws_message(&relay, &tx, &id, Message::Text(frame.to_string())));

        assert!(matches!(rx.recv().await.unwrap(), ServerMessage::Error { .. }));
    }

    #[tokio::test]
    async fn test_binary_rejected() {
        let (relay, id, tx, mut rx) = connected().await;

        assert!(handle_ws_message(&relay, &tx, &id, Message::Binary(vec![1, 2, 3])));
        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::Error {
                message: "Binary messages not supported".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_close_ends_connection() {
        let (relay, id, tx, _rx) = connected().await;
        assert!(!handle_ws_message(&relay, &tx, &id, Message::Close(None)));
    }

    #[tokio::test]
    async fn test_text_event_dispatched() {
        let (relay, id, tx, mut rx) = connected().await;

        let frame = r#"{"event":"sendMessage","text":"hi","ack":9}"#;
        assert!(handle_ws_message(&relay, &tx, &id, Message::Text(frame.to_string())));

        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::Ack {
                ack: 9,
                error: Some("Unable to send message, user not found.".to_string()),
            }
        );
    }
}
