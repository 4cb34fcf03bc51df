//! # Huddle
//!
//! Real-time chat relay. Clients join named rooms over a WebSocket,
//! exchange text messages and location links, and receive presence
//! updates as people come and go.
//!
//! ## Modules
//!
//! - [`registry`]: Who is in which room, with per-room unique names
//! - [`relay`]: Connection state machine and event handlers
//! - [`gateway`]: WebSocket connections, frames and channel fan-out
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use huddle::api::{serve, AppState};
//! use huddle::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let state = AppState::spawn(
//!         config.server.clone(),
//!         config.gateway.clone(),
//!         config.relay.clone(),
//!     );
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod gateway;
pub mod registry;
pub mod relay;

pub use registry::{RegistryError, RegistryResult, RoomRegistry, SessionId, SessionUser};

pub use relay::{ConnectionState, Relay, RelayConfig, RelayError, RelayHandle, RelayStats};

pub use gateway::{
    websocket_handler, ChatMessage, ClientMessage, Gateway, GatewayConfig, GatewayError,
    LocationMessage, RoomData, RosterEntry, ServerMessage,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig, ServerConfig};
