// src/reload/server.rs

//! WebSocket accept loop for live reload.

use std::net::TcpListener;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::reload::clients::ReloadHub;

/// Maximum port retry attempts when the requested port is taken.
const MAX_PORT_RETRIES: u16 = 10;

/// Start the WebSocket server on `base_port` (or the next free port) and
/// return the hub plus the port that was actually bound.
///
/// The accept loop runs on a plain thread; tungstenite's blocking handshake
/// and the per-socket sends never touch the async runtime.
pub fn start_reload_server(host: &str, base_port: u16) -> Result<(ReloadHub, u16)> {
    let (listener, actual_port) = try_bind_port(host, base_port, MAX_PORT_RETRIES)?;
    let hub = ReloadHub::new();

    let accept_hub = hub.clone();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => match tungstenite::accept(stream) {
                    Ok(ws) => accept_hub.register(ws),
                    Err(err) => debug!(error = %err, "websocket handshake failed"),
                },
                Err(err) => {
                    warn!(error = %err, "reload server accept error");
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    });

    info!(port = actual_port, "live-reload websocket listening");
    Ok((hub, actual_port))
}

/// Try binding to a port, retrying with incremented ports if in use.
fn try_bind_port(host: &str, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("{host}:{port}")) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind reload server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
