#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assetpipe::config::{load_and_validate_str, ConfigFile};
use tempfile::TempDir;

/// Builds a throwaway project tree (source files + config) for pipeline
/// tests.
///
/// The generated configuration rewrites the whole path table with absolute
/// paths into the temp directory, so tests never depend on the working
/// directory. Keep the builder alive for as long as the config is in use;
/// dropping it deletes the tree.
pub struct ProjectBuilder {
    root: TempDir,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("failed to create temp project dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Write a file at `rel` (relative to the project root), creating
    /// parent directories as needed.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, contents).expect("failed to write project file");
        self
    }

    /// Write raw bytes at `rel`.
    pub fn binary_file(self, rel: &str, contents: &[u8]) -> Self {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, contents).expect("failed to write project file");
        self
    }

    /// Absolute path of a file inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Validated config whose path table points into this project.
    pub fn config(&self) -> ConfigFile {
        self.config_with_extra("")
    }

    /// Like [`config`](Self::config), with extra TOML appended (e.g. a
    /// `[runner]` or `[build]` section override).
    pub fn config_with_extra(&self, extra: &str) -> ConfigFile {
        load_and_validate_str(&self.config_toml(extra))
            .expect("builder produced an invalid config")
    }

    /// Write the generated config as `Assetpipe.toml` inside the project
    /// and return its absolute path, for tests that drive the top-level
    /// entry point instead of individual task bodies.
    pub fn write_config(&self) -> PathBuf {
        let path = self.root.path().join("Assetpipe.toml");
        fs::write(&path, self.config_toml("")).expect("failed to write config file");
        path
    }

    fn config_toml(&self, extra: &str) -> String {
        let root = self.root.path().display();
        format!(
            r#"
[build]
source_dir = "{root}/dev"
output_dir = "{root}/build"

[paths.html]
src = "{root}/dev/html/*.html"
dest = "{root}/build"
partials = "{root}/dev/html/partials"
watch = ["{root}/dev/html/**/*.html"]

[paths.styles]
src = "{root}/dev/styles/styles.css"
dest = "{root}/build/assets/css"
watch = ["{root}/dev/styles/**/*.css"]

[paths.scripts]
src = "{root}/dev/scripts/scripts.js"
dest = "{root}/build/assets/js"
watch = ["{root}/dev/scripts/**/*.js"]

[paths.vendor]
src = "{root}/dev/scripts/vendor/*.js"
dest = "{root}/build/assets/js/vendor"

[paths.images]
src = "{root}/dev/media/images/*.{{png,jpg,gif}}"
dest = "{root}/build/assets/img"

[paths.audio]
src = "{root}/dev/media/audio/*.*"
dest = "{root}/build/assets/aud"

[paths.video]
src = "{root}/dev/media/videos/*.*"
dest = "{root}/build/assets/vid"

[paths.svg]
src = "{root}/dev/media/svg/*.svg"
dest = "{root}/build/assets/img"
sprite = "{root}/build/assets/img/svg.svg"

[paths.misc]
src = "{root}/dev/extra/root/*"
dest = "{root}/build"

[paths.fonts]
src = "{root}/dev/extra/fonts/*"
dest = "{root}/build/assets/fonts"

{extra}
"#
        )
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}
