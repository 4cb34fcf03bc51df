//! Relay task
//!
//! A single task owns the [`Relay`] and applies commands one at a time in
//! arrival order. Connection tasks talk to it through a [`RelayHandle`].

use tokio::sync::{mpsc, oneshot};

use super::handlers::{Relay, RelayStats};
use crate::gateway::{ClientMessage, GatewayError, ServerMessage};
use crate::registry::SessionId;

/// Work items for the relay task
#[derive(Debug)]
pub enum RelayCommand {
    /// Register a new connection
    Connect {
        sender: mpsc::UnboundedSender<ServerMessage>,
        reply: oneshot::Sender<Result<SessionId, GatewayError>>,
    },
    /// A parsed client event
    Event {
        session_id: SessionId,
        message: ClientMessage,
    },
    /// The connection went away
    Disconnect { session_id: SessionId },
    /// Read the counters
    Stats { reply: oneshot::Sender<RelayStats> },
}

/// Cloneable front door to the relay task
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::UnboundedSender<RelayCommand>,
}

impl RelayHandle {
    /// Start the relay task
    ///
    /// The task stops once every handle has been dropped.
    pub fn spawn(relay: Relay) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(relay, rx));
        Self { tx }
    }

    /// Register a connection; outbound frames will be pushed to `sender`
    pub async fn connect(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<SessionId, GatewayError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RelayCommand::Connect { sender, reply })
            .map_err(|_| GatewayError::RelayUnavailable)?;
        rx.await.map_err(|_| GatewayError::RelayUnavailable)?
    }

    /// Queue a client event. Outcomes reach the client as frames.
    pub fn dispatch(&self, session_id: &str, message: ClientMessage) -> Result<(), GatewayError> {
        self.tx
            .send(RelayCommand::Event {
                session_id: session_id.to_string(),
                message,
            })
            .map_err(|_| GatewayError::RelayUnavailable)
    }

    /// Queue a disconnect
    pub fn disconnect(&self, session_id: &str) {
        let _ = self.tx.send(RelayCommand::Disconnect {
            session_id: session_id.to_string(),
        });
    }

    pub async fn stats(&self) -> Result<RelayStats, GatewayError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RelayCommand::Stats { reply })
            .map_err(|_| GatewayError::RelayUnavailable)?;
        rx.await.map_err(|_| GatewayError::RelayUnavailable)
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

async fn run(mut relay: Relay, mut rx: mpsc::UnboundedReceiver<RelayCommand>) {
    tracing::debug!("Relay task started");

    while let Some(command) = rx.recv().await {
        match command {
            RelayCommand::Connect { sender, reply } => {
                let result = relay.connect(sender);
                if let Err(e) = &result {
                    tracing::warn!(error = %e, "Connection refused");
                }
                if let Err(Ok(id)) = reply.send(result) {
                    // Caller went away before hearing back
                    relay.disconnect(&id);
                }
            }
            RelayCommand::Event {
                session_id,
                message,
            } => relay.handle_client_message(&session_id, message),
            RelayCommand::Disconnect { session_id } => {
                relay.disconnect(&session_id);
            }
            RelayCommand::Stats { reply } => {
                let _ = reply.send(relay.stats());
            }
        }
    }

    tracing::debug!("Relay task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, GatewayConfig};
    use crate::relay::RelayConfig;

    fn spawn_relay(max_connections: usize) -> RelayHandle {
        let gateway = Gateway::new(GatewayConfig { max_connections });
        RelayHandle::spawn(Relay::new(RelayConfig::default(), gateway))
    }

    #[tokio::test]
    async fn test_connect_and_stats() {
        let handle = spawn_relay(10);
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = handle.connect(tx).await.unwrap();
        assert!(!id.is_empty());
        assert!(handle.is_running());

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.users, 0);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let handle = spawn_relay(1);
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        handle.connect(tx1).await.unwrap();
        let result = handle.connect(tx2).await;
        assert!(matches!(result, Err(GatewayError::TooManyConnections(1))));
    }

    #[tokio::test]
    async fn test_dispatch_in_order() {
        let handle = spawn_relay(10);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = handle.connect(tx).await.unwrap();

        handle
            .dispatch(
                &id,
                ClientMessage::Join {
                    username: "Alice".to_string(),
                    room: "lobby".to_string(),
                    ack: Some(1),
                },
            )
            .unwrap();
        handle
            .dispatch(
                &id,
                ClientMessage::SendMessage {
                    text: "hi".to_string(),
                    ack: Some(2),
                },
            )
            .unwrap();

        let mut frames = Vec::new();
        while frames.len() < 5 {
            frames.push(rx.recv().await.unwrap());
        }

        assert!(matches!(frames[0], ServerMessage::Message(_)));
        assert!(matches!(frames[1], ServerMessage::RoomData(_)));
        assert_eq!(frames[2], ServerMessage::Ack { ack: 1, error: None });
        match &frames[3] {
            ServerMessage::Message(m) => assert_eq!(m.text, "hi"),
            other => panic!("Expected Message, got {:?}", other),
        }
        assert_eq!(frames[4], ServerMessage::Ack { ack: 2, error: None });
    }

    #[tokio::test]
    async fn test_disconnect_frees_slot() {
        let handle = spawn_relay(1);
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let id = handle.connect(tx1).await.unwrap();

        handle.disconnect(&id);

        let (tx2, _rx2) = mpsc::unbounded_channel();
        assert!(handle.connect(tx2).await.is_ok());
    }
}
