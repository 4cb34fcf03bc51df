//! Chat Relay
//!
//! Connection state machine and event handlers that sit between the
//! gateway and the room registry.
//!
//! ## Events
//!
//! | Event          | Allowed in  | Effect                                         |
//! |----------------|-------------|------------------------------------------------|
//! | `join`         | `Connected` | register user, welcome, announce, send roster  |
//! | `sendMessage`  | `Joined`    | text to the whole room                         |
//! | `sendLocation` | `Joined`    | map link to the whole room                     |
//! | disconnect     | any         | remove user, announce, send roster to the rest |
//!
//! Rejected events are answered through the client's ack with a plain
//! error string.

mod error;
pub mod format;
mod handlers;
mod service;
mod state;

pub use error::RelayError;
pub use handlers::{Relay, RelayStats};
pub use service::{RelayCommand, RelayHandle};
pub use state::ConnectionState;

use format::DEFAULT_MAPS_BASE_URL;
use serde::Deserialize;

/// Relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Sender name on system messages
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    /// Text sent to a user right after joining
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// Prefix for location links; coordinates are appended as `lat,lng`
    #[serde(default = "default_maps_base_url")]
    pub maps_base_url: String,
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

fn default_welcome_message() -> String {
    "Welcome".to_string()
}

fn default_maps_base_url() -> String {
    DEFAULT_MAPS_BASE_URL.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            admin_name: default_admin_name(),
            welcome_message: default_welcome_message(),
            maps_base_url: default_maps_base_url(),
        }
    }
}
