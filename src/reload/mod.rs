// src/reload/mod.rs

//! Live-reload push channel.
//!
//! A small WebSocket server runs next to the HTTP dev server. The runtime
//! broadcasts [`ReloadMessage`]s to every connected browser: CSS swaps on
//! style rebuilds, full reloads on script/HTML rebuilds, and an error
//! overlay when a task fails.

pub mod clients;
pub mod message;
pub mod server;

pub use clients::ReloadHub;
pub use message::ReloadMessage;
pub use server::start_reload_server;
