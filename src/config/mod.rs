// src/config/mod.rs

//! Configuration loading and validation.
//!
//! The configuration is a TOML file (`Assetpipe.toml`) holding the path
//! table (one `[paths.<category>]` entry per asset category), the dev-server
//! section and build options. Every section is optional; built-in defaults
//! reproduce the conventional `dev/` -> `build/` source tree.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_and_validate_str, load_from_path};
pub use model::{
    AssetCategory, BuildSection, ConfigFile, PathEntry, RawConfigFile, RunnerSection,
    ServeSection,
};
