//! Gateway Connection Table
//!
//! Tracks live connections and the channels they have joined, and fans
//! frames out to them. Owned by the relay task, so there is no locking;
//! every send is a non-blocking push onto the connection's outbound queue.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ServerMessage;
use crate::registry::SessionId;

/// Configuration for the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Maximum number of concurrent connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    1000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

/// Handle for sending frames to a specific connection
struct ConnectionHandle {
    /// Outbound queue drained by the connection's writer task
    sender: mpsc::UnboundedSender<ServerMessage>,
    /// Channels this connection has joined
    channels: HashSet<String>,
}

/// All live connections and channel memberships
pub struct Gateway {
    /// Active connections: SessionId → ConnectionHandle
    connections: HashMap<SessionId, ConnectionHandle>,
    /// Channel memberships: channel → set of SessionIds
    channels: HashMap<String, HashSet<SessionId>>,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            connections: HashMap::new(),
            channels: HashMap::new(),
            config,
        }
    }

    /// Register a new connection and assign it a session id
    ///
    /// Returns an error if the connection limit has been reached.
    pub fn register(
        &mut self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<SessionId, GatewayError> {
        if self.connections.len() >= self.config.max_connections {
            return Err(GatewayError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        let handle = ConnectionHandle {
            sender,
            channels: HashSet::new(),
        };
        self.connections.insert(id.clone(), handle);

        tracing::info!(session_id = %id, "New WebSocket connection");
        Ok(id)
    }

    /// Drop a connection and its channel memberships
    ///
    /// Returns false if the session was not registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        let Some(handle) = self.connections.remove(id) else {
            return false;
        };

        for channel in handle.channels {
            if let Some(members) = self.channels.get_mut(&channel) {
                members.remove(id);
                if members.is_empty() {
                    self.channels.remove(&channel);
                }
            }
        }

        tracing::info!(session_id = %id, "WebSocket disconnected");
        true
    }

    /// Add a connection to a channel
    pub fn join_channel(&mut self, id: &str, channel: &str) -> Result<(), GatewayError> {
        let handle = self
            .connections
            .get_mut(id)
            .ok_or(GatewayError::ConnectionNotFound)?;

        handle.channels.insert(channel.to_string());
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(id.to_string());

        tracing::debug!(session_id = %id, channel = %channel, "Joined channel");
        Ok(())
    }

    /// Send a frame to one connection
    pub fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), GatewayError> {
        let handle = self
            .connections
            .get(id)
            .ok_or(GatewayError::ConnectionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| GatewayError::SendFailed)
    }

    /// Send a frame to every member of a channel, optionally skipping one
    ///
    /// Returns how many connections the frame was handed to.
    pub fn broadcast(&self, channel: &str, message: &ServerMessage, except: Option<&str>) -> usize {
        let Some(members) = self.channels.get(channel) else {
            return 0;
        };

        let mut sent_count = 0;
        for id in members {
            if except == Some(id.as_str()) {
                continue;
            }
            if let Some(handle) = self.connections.get(id) {
                if handle.sender.send(message.clone()).is_ok() {
                    sent_count += 1;
                }
            }
        }

        tracing::trace!(channel = %channel, recipients = sent_count, "Broadcast");
        sent_count
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn member_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map(|m| m.len()).unwrap_or(0)
    }
}

/// Errors that can occur in the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,

    #[error("Relay is not running")]
    RelayUnavailable,
}
