// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetpipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in task DAG: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Style compilation failed for {file}: {message}")]
    StyleCompile { file: String, message: String },

    #[error("Script bundling failed for {file}: {message}")]
    ScriptBundle { file: String, message: String },

    #[error("Missing partial '{partial}' included from {page}")]
    MissingPartial { partial: String, page: String },

    #[error("Malformed include directive in {page} (line {line}): {detail}")]
    MalformedInclude {
        page: String,
        line: usize,
        detail: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetpipeError>;
