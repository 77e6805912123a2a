// src/exec/mod.rs

//! Task execution layer.
//!
//! This module is responsible for actually running pipeline tasks (style
//! compilation, bundling, copies, ...) and reporting back to the
//! orchestration runtime via `RuntimeEvent`s. Tasks are CPU/IO bound
//! in-process transforms, so they run on the blocking thread pool rather
//! than as child processes.
//!
//! - [`runner`] owns the background executor loop.
//! - [`backend`] provides the `ExecutorBackend` trait and a concrete
//!   `RealExecutorBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.

pub mod backend;
pub mod runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use runner::spawn_executor;
