//! Application State
//!
//! Shared state accessible by all HTTP and WebSocket handlers.

use crate::config::ServerConfig;
use crate::gateway::{Gateway, GatewayConfig};
use crate::relay::{Relay, RelayConfig, RelayHandle};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Front door to the relay task
    pub relay: RelayHandle,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an already running relay
    pub fn new(relay: RelayHandle, config: ServerConfig) -> Self {
        Self {
            relay,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Spawn a relay task and wrap it in state
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        config: ServerConfig,
        gateway_config: GatewayConfig,
        relay_config: RelayConfig,
    ) -> Self {
        let relay = Relay::new(relay_config, Gateway::new(gateway_config));
        Self::new(RelayHandle::spawn(relay), config)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
