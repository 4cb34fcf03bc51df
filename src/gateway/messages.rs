//! WebSocket Message Types
//!
//! Defines all frames exchanged between chat clients and the relay.
//! Every frame is a JSON object tagged by its `event` field.

use serde::{Deserialize, Serialize};

/// Frames sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join a room under a display name
    Join {
        username: String,
        room: String,
        /// Ack id echoed back once the event is handled
        #[serde(default)]
        ack: Option<u64>,
    },
    /// Send a text message to the current room
    SendMessage {
        text: String,
        #[serde(default)]
        ack: Option<u64>,
    },
    /// Share a location with the current room
    SendLocation {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        ack: Option<u64>,
    },
}

impl ClientMessage {
    pub fn ack(&self) -> Option<u64> {
        match self {
            ClientMessage::Join { ack, .. }
            | ClientMessage::SendMessage { ack, .. }
            | ClientMessage::SendLocation { ack, .. } => *ack,
        }
    }

    /// Event name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::Join { .. } => "join",
            ClientMessage::SendMessage { .. } => "sendMessage",
            ClientMessage::SendLocation { .. } => "sendLocation",
        }
    }
}

/// Frames sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    /// Chat text, from a user or from the system
    Message(ChatMessage),
    /// Shared location
    LocationMessage(LocationMessage),
    /// Current roster of a room
    RoomData(RoomData),
    /// Outcome of a client event that carried an ack id
    Ack {
        ack: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Malformed frame
    Error { message: String },
}

/// Text message payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

/// Location message payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMessage {
    pub sender: String,
    pub url: String,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

/// Room roster payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomData {
    pub room: String,
    pub users: Vec<RosterEntry>,
}

/// A roster entry. Carries no session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub username: String,
    pub room: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialize_join() {
        let json = r#"{"event": "join", "username": "Alice", "room": "lobby", "ack": 7}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Join {
                username,
                room,
                ack,
            } => {
                assert_eq!(username, "Alice");
                assert_eq!(room, "lobby");
                assert_eq!(ack, Some(7));
            }
            _ => panic!("Expected Join"),
        }
    }

    #[test]
    fn test_client_message_deserialize_without_ack() {
        let json = r#"{"event": "sendMessage", "text": "hi"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.ack(), None);
        assert_eq!(msg.name(), "sendMessage");
    }

    #[test]
    fn test_client_message_deserialize_location() {
        let json = r#"{"event": "sendLocation", "latitude": 51.5, "longitude": -0.12, "ack": 2}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::SendLocation { latitude, longitude, ack: Some(2) }
                if latitude == 51.5 && longitude == -0.12
        ));
    }

    #[test]
    fn test_client_message_rejects_unknown_event() {
        let json = r#"{"event": "shout", "text": "hi"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize_chat() {
        let msg = ServerMessage::Message(ChatMessage {
            sender: "Bob".to_string(),
            text: "hi".to_string(),
            created_at: 1699000000000,
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"event\":\"message\""));
        assert!(json.contains("\"sender\":\"Bob\""));
        assert!(json.contains("\"createdAt\":1699000000000"));
    }

    #[test]
    fn test_server_message_serialize_room_data() {
        let msg = ServerMessage::RoomData(RoomData {
            room: "lobby".to_string(),
            users: vec![RosterEntry {
                username: "Alice".to_string(),
                room: "lobby".to_string(),
            }],
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"event":"roomData","room":"lobby","users":[{"username":"Alice","room":"lobby"}]}"#
        );
    }

    #[test]
    fn test_server_message_serialize_ack() {
        let ok = ServerMessage::Ack { ack: 3, error: None };
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"event":"ack","ack":3}"#);

        let failed = ServerMessage::Ack {
            ack: 4,
            error: Some("Username is in use!".to_string()),
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"error\":\"Username is in use!\""));
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            session_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"event\":\"connected\""));
        assert!(json.contains("\"sessionId\":\"abc-123\""));
    }
}
