//! Event handlers
//!
//! `Relay` owns the room registry, the gateway connection table and every
//! connection's state. Each method runs to completion and never suspends.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::mpsc;

use super::error::RelayError;
use super::format::{generate_location_message, generate_message, location_url};
use super::state::ConnectionState;
use super::RelayConfig;
use crate::gateway::{
    ClientMessage, Gateway, GatewayError, RoomData, RosterEntry, ServerMessage,
};
use crate::registry::{RoomRegistry, SessionId, SessionUser};

/// Snapshot of relay counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub connections: usize,
    pub users: usize,
    pub rooms: usize,
}

pub struct Relay {
    registry: RoomRegistry,
    gateway: Gateway,
    sessions: HashMap<SessionId, ConnectionState>,
    /// Display name per room key, taken from the room's first joiner
    room_names: HashMap<String, String>,
    config: RelayConfig,
}

impl Relay {
    pub fn new(config: RelayConfig, gateway: Gateway) -> Self {
        Self {
            registry: RoomRegistry::new(),
            gateway,
            sessions: HashMap::new(),
            room_names: HashMap::new(),
            config,
        }
    }

    /// Register a connection with the gateway and start it in `Connected`
    pub fn connect(
        &mut self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<SessionId, GatewayError> {
        let id = self.gateway.register(sender)?;
        self.sessions.insert(id.clone(), ConnectionState::Connected);
        Ok(id)
    }

    /// Dispatch a client event and answer its ack, if it carried one
    ///
    /// The ack goes out after every frame the event produced.
    pub fn handle_client_message(&mut self, id: &str, message: ClientMessage) {
        let ack = message.ack();
        let event = message.name();

        let result = match message {
            ClientMessage::Join { username, room, .. } => {
                self.join(id, &username, &room).map(|_| ())
            }
            ClientMessage::SendMessage { text, .. } => self.send_message(id, &text),
            ClientMessage::SendLocation {
                latitude,
                longitude,
                ..
            } => self.send_location(id, latitude, longitude),
        };

        if let Err(e) = &result {
            tracing::debug!(session_id = %id, event, error = %e, "Event rejected");
        }

        if let Some(ack) = ack {
            let reply = ServerMessage::Ack {
                ack,
                error: result.err().map(|e| e.to_string()),
            };
            let _ = self.gateway.send_to(id, reply);
        }
    }

    /// Join a room
    ///
    /// Welcomes the user, tells the rest of the room, then sends the new
    /// roster to everyone in it.
    pub fn join(&mut self, id: &str, username: &str, room: &str) -> Result<SessionUser, RelayError> {
        match self.sessions.get(id) {
            Some(state) => state.can_join()?,
            None => return Err(RelayError::Disconnected),
        }

        let user = self.registry.add_user(id, username, room)?;

        if self.gateway.join_channel(id, user.room_key()).is_err() {
            self.registry.remove_user(id);
            return Err(RelayError::Disconnected);
        }
        if let Some(state) = self.sessions.get_mut(id) {
            state.join(user.room_key());
        }
        self.room_names
            .entry(user.room_key().to_string())
            .or_insert_with(|| user.room.clone());

        let welcome = generate_message(&self.config.admin_name, &self.config.welcome_message);
        let _ = self.gateway.send_to(id, ServerMessage::Message(welcome));

        let joined = generate_message(
            &self.config.admin_name,
            format!("{} has joined the chat!", user.username),
        );
        self.gateway
            .broadcast(user.room_key(), &ServerMessage::Message(joined), Some(id));

        self.broadcast_room_data(user.room_key());

        tracing::info!(
            session_id = %id,
            username = %user.username,
            room = %user.room,
            "User joined room"
        );
        Ok(user)
    }

    /// Send a text message to everyone in the sender's room
    pub fn send_message(&self, id: &str, text: &str) -> Result<(), RelayError> {
        let user = self.joined_user(id, RelayError::send_message_not_found)?;

        let message = generate_message(&user.username, text);
        self.gateway
            .broadcast(user.room_key(), &ServerMessage::Message(message), None);
        Ok(())
    }

    /// Send a map link to everyone in the sender's room
    pub fn send_location(&self, id: &str, latitude: f64, longitude: f64) -> Result<(), RelayError> {
        let user = self.joined_user(id, RelayError::share_location_not_found)?;

        let url = location_url(&self.config.maps_base_url, latitude, longitude);
        let message = generate_location_message(&user.username, url);
        self.gateway
            .broadcast(user.room_key(), &ServerMessage::LocationMessage(message), None);
        Ok(())
    }

    /// Tear down a connection
    ///
    /// If the user had joined a room, the remaining members are told and
    /// get the updated roster. Unknown ids are ignored.
    pub fn disconnect(&mut self, id: &str) -> Option<SessionUser> {
        let left_room = self
            .sessions
            .remove(id)
            .and_then(|mut state| state.disconnect());
        self.gateway.unregister(id);

        let user = self.registry.remove_user(id)?;
        let room_key = left_room.unwrap_or_else(|| user.room_key().to_string());

        let left = generate_message(
            &self.config.admin_name,
            format!("{} has left!", user.username),
        );
        self.gateway
            .broadcast(&room_key, &ServerMessage::Message(left), None);
        self.broadcast_room_data(&room_key);

        if self.registry.get_users_in_room(&room_key).is_empty() {
            self.room_names.remove(&room_key);
        }

        tracing::info!(
            session_id = %id,
            username = %user.username,
            room = %user.room,
            "User left room"
        );
        Some(user)
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            connections: self.gateway.connection_count(),
            users: self.registry.len(),
            rooms: self.registry.room_count(),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    fn joined_user(
        &self,
        id: &str,
        not_found: fn() -> RelayError,
    ) -> Result<&SessionUser, RelayError> {
        if !self.sessions.get(id).is_some_and(ConnectionState::is_joined) {
            return Err(not_found());
        }
        self.registry.require_user(id).map_err(|_| not_found())
    }

    fn broadcast_room_data(&self, room_key: &str) {
        let Some(room) = self.room_names.get(room_key) else {
            return;
        };

        let users = self
            .registry
            .get_users_in_room(room_key)
            .into_iter()
            .map(|user| RosterEntry {
                username: user.username.clone(),
                room: room.clone(),
            })
            .collect();

        let data = RoomData {
            room: room.clone(),
            users,
        };
        self.gateway
            .broadcast(room_key, &ServerMessage::RoomData(data), None);
    }
}
