//! Shared helpers for the `assetpipe` test suites: tracing setup, async
//! timeouts, the scripted executor backend and the throwaway project
//! builder.

pub mod builders;
pub mod fake_executor;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Set up tracing once for the whole test binary.
///
/// Output goes through `with_test_writer()`, so it is only shown for
/// failing tests (or under `-- --nocapture`). The filter reads
/// `ASSETPIPE_LOG` first and falls back to `RUST_LOG`, mirroring the
/// precedence in the binary's own logging setup; with neither set, only
/// warnings and errors from the pipeline print.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = std::env::var("ASSETPIPE_LOG")
            .ok()
            .map(EnvFilter::new)
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Bound an async test so a stuck scheduler or a lost channel message
/// fails the test instead of hanging the suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    match tokio::time::timeout(Duration::from_secs(10), f).await {
        Ok(value) => value,
        Err(_) => panic!("async test exceeded the 10 second budget"),
    }
}
