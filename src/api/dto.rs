//! Data Transfer Objects
//!
//! Response bodies for the HTTP endpoints.

use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Relay task status
    pub relay: String,
    /// Open WebSocket connections
    pub connections: usize,
    /// Users currently in a room
    pub users: usize,
    /// Rooms with at least one user
    pub rooms: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
