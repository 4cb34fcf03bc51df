//! Room Registry
//!
//! In-memory record of which session is in which room under which name.
//!
//! ## Invariants
//!
//! - Within a room, usernames are unique ignoring case and surrounding whitespace
//! - Records are kept in join order
//! - A record is never updated in place; leaving and rejoining replaces it
//!
//! The registry has no interior locking. It is owned by the relay task and
//! mutated through `&mut self` only.

mod error;
mod types;

pub use error::{RegistryError, RegistryResult};
pub use types::{normalize, SessionId, SessionUser};

use std::collections::HashSet;

/// Ordered collection of joined users
#[derive(Debug, Default)]
pub struct RoomRegistry {
    users: Vec<SessionUser>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user to a room
    ///
    /// Fails with [`RegistryError::Validation`] if either name is blank and
    /// with [`RegistryError::DuplicateUser`] if the name is taken in that room.
    pub fn add_user(
        &mut self,
        id: impl Into<SessionId>,
        username: &str,
        room: &str,
    ) -> RegistryResult<SessionUser> {
        let username = username.trim();
        let room = room.trim();

        if username.is_empty() || room.is_empty() {
            return Err(RegistryError::Validation);
        }

        let user = SessionUser::new(id.into(), username, room);

        let taken = self
            .users
            .iter()
            .any(|u| u.in_room(user.room_key()) && u.username_key() == user.username_key());
        if taken {
            return Err(RegistryError::DuplicateUser);
        }

        self.users.push(user.clone());
        Ok(user)
    }

    /// Remove a user by session id. Removing an unknown id is a no-op.
    pub fn remove_user(&mut self, id: &str) -> Option<SessionUser> {
        let index = self.users.iter().position(|u| u.id == id)?;
        Some(self.users.remove(index))
    }

    pub fn get_user(&self, id: &str) -> Option<&SessionUser> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Like [`get_user`](Self::get_user) but returns [`RegistryError::NotFound`]
    pub fn require_user(&self, id: &str) -> RegistryResult<&SessionUser> {
        self.get_user(id).ok_or(RegistryError::NotFound)
    }

    /// All users in a room, in join order
    pub fn get_users_in_room(&self, room: &str) -> Vec<&SessionUser> {
        let room_key = normalize(room);
        self.users.iter().filter(|u| u.in_room(&room_key)).collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Number of distinct rooms with at least one user
    pub fn room_count(&self) -> usize {
        self.users
            .iter()
            .map(|u| u.room_key())
            .collect::<HashSet<_>>()
            .len()
    }
}
