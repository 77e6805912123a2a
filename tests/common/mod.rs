#![allow(dead_code)]

pub use assetpipe_test_utils::builders::ProjectBuilder;
pub use assetpipe_test_utils::fake_executor::FakeExecutor;
pub use assetpipe_test_utils::{init_tracing, with_timeout};
