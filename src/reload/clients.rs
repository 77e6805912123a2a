// src/reload/clients.rs

//! Connected reload clients.

use std::net::TcpStream;
use std::sync::{Arc, Mutex};

use tracing::debug;
use tungstenite::{Message, WebSocket};

use crate::reload::message::ReloadMessage;

/// Shared registry of connected browser sockets.
///
/// The accept thread registers new connections; the runtime broadcasts to
/// all of them. Dead sockets are pruned on the first failed send.
#[derive(Clone, Default)]
pub struct ReloadHub {
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl ReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, ws: WebSocket<TcpStream>) {
        let mut clients = self.clients.lock().unwrap_or_else(|p| p.into_inner());
        clients.push(ws);
        debug!(connected = clients.len(), "reload client registered");
    }

    pub fn client_count(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .len()
    }

    /// Send a message to every connected client, dropping clients whose
    /// socket errors out.
    pub fn broadcast(&self, msg: &ReloadMessage) {
        let json = msg.to_json();
        let mut clients = self.clients.lock().unwrap_or_else(|p| p.into_inner());
        let before = clients.len();

        clients.retain_mut(|ws| ws.send(Message::text(json.clone())).is_ok());

        if clients.len() < before {
            debug!(
                dropped = before - clients.len(),
                remaining = clients.len(),
                "pruned dead reload clients"
            );
        }
    }
}

impl std::fmt::Debug for ReloadHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadHub")
            .field("clients", &self.client_count())
            .finish()
    }
}
