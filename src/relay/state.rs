//! Per-connection state machine
//!
//! `Connected` → `Joined` → `Disconnected`. There is no way back from
//! `Disconnected`, and a connection joins at most one room.

use super::error::RelayError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Connected, not in a room yet
    #[default]
    Connected,
    /// In a room; `room_key` is the normalized room name
    Joined { room_key: String },
    /// Terminal
    Disconnected,
}

impl ConnectionState {
    /// Check that a join is allowed from this state
    pub fn can_join(&self) -> Result<(), RelayError> {
        match self {
            ConnectionState::Connected => Ok(()),
            ConnectionState::Joined { .. } => Err(RelayError::AlreadyJoined),
            ConnectionState::Disconnected => Err(RelayError::Disconnected),
        }
    }

    /// Room the connection is in, if joined
    pub fn room_key(&self) -> Option<&str> {
        match self {
            ConnectionState::Joined { room_key } => Some(room_key),
            _ => None,
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self, ConnectionState::Joined { .. })
    }

    pub fn join(&mut self, room_key: impl Into<String>) {
        *self = ConnectionState::Joined {
            room_key: room_key.into(),
        };
    }

    /// Move to `Disconnected`, returning the room that was left
    pub fn disconnect(&mut self) -> Option<String> {
        match std::mem::replace(self, ConnectionState::Disconnected) {
            ConnectionState::Joined { room_key } => Some(room_key),
            _ => None,
        }
    }
}
