// src/serve/mod.rs

//! Local HTTP dev server.
//!
//! Serves the build output directory over plain HTTP. HTML responses get
//! the live-reload client script injected before `</body>`. Local
//! development only: no auth, no caching, no directory listings.

pub mod http;
pub mod inject;
pub mod mime;

pub use http::start_http_server;
