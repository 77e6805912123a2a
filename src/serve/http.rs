// src/serve/http.rs

//! Static file server over the build output directory.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use tiny_http::{Header, Request, Response, Server};
use tracing::{debug, info, warn};

use crate::serve::inject::inject_hotreload;
use crate::serve::mime;

/// Start serving `output_dir` on `host:port`. Requests are handled on a
/// dedicated thread so the async runtime is never involved.
///
/// When `ws_port` is set, HTML responses get the live-reload client
/// injected and pointed at that websocket port.
pub fn start_http_server(
    host: &str,
    port: u16,
    output_dir: PathBuf,
    ws_port: Option<u16>,
) -> Result<()> {
    let addr = format!("{host}:{port}");
    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to bind http server on {addr}: {e}"))?;

    info!(url = %format!("http://{addr}/"), "dev server listening");

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            handle_request(request, &output_dir, ws_port);
        }
    });

    Ok(())
}

fn handle_request(request: Request, output_dir: &Path, ws_port: Option<u16>) {
    let url = request.url().to_string();

    let Some(file_path) = resolve_path(output_dir, &url) else {
        debug!(%url, "rejected request path");
        respond_not_found(request, &url);
        return;
    };

    let body = match std::fs::read(&file_path) {
        Ok(body) => body,
        Err(_) => {
            respond_not_found(request, &url);
            return;
        }
    };

    let content_type = mime::from_path(&file_path);

    let body = if content_type.starts_with("text/html") {
        match ws_port {
            Some(ws_port) => inject_hotreload(body, ws_port),
            None => body,
        }
    } else {
        body
    };

    let mut response = Response::from_data(body);
    if let Some(header) = content_type_header(content_type) {
        response = response.with_header(header);
    }
    if let Err(err) = request.respond(response) {
        warn!(error = %err, %url, "failed to send response");
    }
}

fn respond_not_found(request: Request, url: &str) {
    debug!(%url, "not found");
    let mut response = Response::from_string(format!("404 not found: {url}\n")).with_status_code(404);
    if let Some(header) = content_type_header("text/plain; charset=utf-8") {
        response = response.with_header(header);
    }
    if let Err(err) = request.respond(response) {
        warn!(error = %err, "failed to send 404 response");
    }
}

fn content_type_header(value: &str) -> Option<Header> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).ok()
}

/// Map a request URL to a file under `output_dir`.
///
/// Strips the query string, rejects any path escaping the output directory
/// and falls back to `index.html` for the root and for directories.
fn resolve_path(output_dir: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.trim_start_matches('/');

    let relative = Path::new(path);
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {}
            _ => return None,
        }
    }

    let mut full = output_dir.join(relative);
    if path.is_empty() || full.is_dir() {
        full = full.join("index.html");
    }
    Some(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index_html() {
        let resolved = resolve_path(Path::new("build"), "/").unwrap();
        assert_eq!(resolved, Path::new("build/index.html"));
    }

    #[test]
    fn query_string_is_stripped() {
        let resolved = resolve_path(Path::new("build"), "/assets/css/styles.min.css?t=123").unwrap();
        assert_eq!(resolved, Path::new("build/assets/css/styles.min.css"));
    }

    #[test]
    fn parent_traversal_is_rejected() {
        assert!(resolve_path(Path::new("build"), "/../Cargo.toml").is_none());
        assert!(resolve_path(Path::new("build"), "/a/../../etc/passwd").is_none());
    }
}
