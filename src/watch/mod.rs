// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling per-task watch glob patterns from the path table.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Content hashing to avoid re-running tasks when watched files haven't
//!   actually changed (editor touch events, no-op saves).
//!
//! It does **not** know about the DAG scheduler's run state; it only turns
//! filesystem changes into task-level triggers. It is DAG-aware in exactly
//! one place: when a path matches several tasks that depend on each other,
//! only the root tasks for that path are triggered.

pub mod cache;
pub mod dag_filter;
pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{build_profiles_from_config, TaskWatchProfile};
pub use watcher::{spawn_watcher, WatcherHandle};
