//! Registry record types

use serde::Serialize;

/// Opaque session identifier assigned by the gateway
pub type SessionId = String;

/// Normalize a name for comparison: trimmed and lower-cased.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A user who has joined a room
///
/// `username` and `room` keep the casing the client sent (trimmed).
/// Comparisons go through the normalized keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    #[serde(skip)]
    pub id: SessionId,
    pub username: String,
    pub room: String,
    #[serde(skip)]
    username_key: String,
    #[serde(skip)]
    room_key: String,
}

impl SessionUser {
    /// Build a record from already-trimmed display values
    pub(crate) fn new(id: SessionId, username: &str, room: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            room: room.to_string(),
            username_key: normalize(username),
            room_key: normalize(room),
        }
    }

    /// Normalized username used for uniqueness checks
    pub fn username_key(&self) -> &str {
        &self.username_key
    }

    /// Normalized room name; also the gateway channel name
    pub fn room_key(&self) -> &str {
        &self.room_key
    }

    pub fn in_room(&self, room_key: &str) -> bool {
        self.room_key == room_key
    }
}
