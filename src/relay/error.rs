//! Relay error types
//!
//! The `Display` text of each variant is sent back to the client verbatim.

use thiserror::Error;

use crate::registry::RegistryError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Registry rejected the join
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Join received while already in a room
    #[error("You have already joined a room.")]
    AlreadyJoined,

    /// Event received for a session that has gone away
    #[error("Connection is closed.")]
    Disconnected,

    /// Message or location sent before joining
    #[error("Unable to {action}, user not found.")]
    UserNotFound { action: &'static str },
}

impl RelayError {
    pub fn send_message_not_found() -> Self {
        RelayError::UserNotFound {
            action: "send message",
        }
    }

    pub fn share_location_not_found() -> Self {
        RelayError::UserNotFound {
            action: "share location",
        }
    }
}
