//! WebSocket Gateway
//!
//! Accepts chat clients on `/ws`, assigns session ids and moves JSON
//! frames between sockets and the relay.
//!
//! ## Architecture
//!
//! - **Gateway**: connection table and channel fan-out
//! - **Handler**: WebSocket upgrade and per-connection read/write tasks
//! - **Messages**: client and server frame formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:3000/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({event: 'join', username: 'Alice', room: 'lobby', ack: 1}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   console.log('Received:', msg);
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{Gateway, GatewayConfig, GatewayError};
pub use messages::{
    ChatMessage, ClientMessage, LocationMessage, RoomData, RosterEntry, ServerMessage,
};
