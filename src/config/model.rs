// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::{AssetpipeError, Result};

/// Asset categories known to the pipeline.
///
/// Every built-in task reads one or more of these from the path table; the
/// validator rejects a configuration in which a task references a category
/// that has no `[paths.<category>]` entry (and no built-in default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Html,
    Styles,
    Scripts,
    Vendor,
    Images,
    Audio,
    Video,
    Svg,
    Misc,
    Fonts,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Html => "html",
            AssetCategory::Styles => "styles",
            AssetCategory::Scripts => "scripts",
            AssetCategory::Vendor => "vendor",
            AssetCategory::Images => "images",
            AssetCategory::Audio => "audio",
            AssetCategory::Video => "video",
            AssetCategory::Svg => "svg",
            AssetCategory::Misc => "misc",
            AssetCategory::Fonts => "fonts",
        }
    }

    /// All categories, in path-table order.
    pub fn all() -> &'static [AssetCategory] {
        &[
            AssetCategory::Html,
            AssetCategory::Styles,
            AssetCategory::Scripts,
            AssetCategory::Vendor,
            AssetCategory::Images,
            AssetCategory::Audio,
            AssetCategory::Video,
            AssetCategory::Svg,
            AssetCategory::Misc,
            AssetCategory::Fonts,
        ]
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `[paths.<category>]` entry: where sources live and where output goes.
#[derive(Debug, Clone, Deserialize)]
pub struct PathEntry {
    /// Source glob (relative to the project root), e.g. `dev/media/svg/*.svg`.
    pub src: String,

    /// Destination directory for this category's output.
    pub dest: PathBuf,

    /// Directory holding HTML partials (html category only).
    #[serde(default)]
    pub partials: Option<PathBuf>,

    /// Output path of the aggregated SVG sprite (svg category only).
    #[serde(default)]
    pub sprite: Option<PathBuf>,

    /// Watch globs for this category; empty means the category is not
    /// watched in watch mode.
    #[serde(default)]
    pub watch: Vec<String>,
}

impl PathEntry {
    fn new(src: &str, dest: &str) -> Self {
        Self {
            src: src.to_string(),
            dest: PathBuf::from(dest),
            partials: None,
            sprite: None,
            watch: Vec::new(),
        }
    }

    fn with_partials(mut self, partials: &str) -> Self {
        self.partials = Some(PathBuf::from(partials));
        self
    }

    fn with_sprite(mut self, sprite: &str) -> Self {
        self.sprite = Some(PathBuf::from(sprite));
        self
    }

    fn with_watch(mut self, pattern: &str) -> Self {
        self.watch.push(pattern.to_string());
        self
    }

    /// Sibling `maps` directory next to this entry's destination, used for
    /// style and script source maps.
    pub fn maps_dir(&self) -> PathBuf {
        match self.dest.parent() {
            Some(parent) => parent.join("maps"),
            None => PathBuf::from("maps"),
        }
    }
}

/// `[serve]` section: local dev server bind address.
///
/// There is deliberately no "open a browser" option and no interaction
/// mirroring between connected clients.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[build]` section: global build options.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Root of the source tree; the watcher observes this directory.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Root of the build output; the dev server serves this directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Browserslist-style browser support matrix for the prefixing stage.
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,

    /// Prefix token starting an HTML include directive, e.g. `@@`.
    #[serde(default = "default_include_prefix")]
    pub include_prefix: String,

    /// Marker comment replaced with the sprite contents during HTML assembly.
    #[serde(default = "default_inject_marker")]
    pub inject_marker: String,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("dev")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_browsers() -> Vec<String> {
    vec![
        "last 3 versions".to_string(),
        "ios >= 8".to_string(),
        "android >= 4.4".to_string(),
    ]
}

fn default_include_prefix() -> String {
    "@@".to_string()
}

fn default_inject_marker() -> String {
    "<!-- inject:svg -->".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            browsers: default_browsers(),
            include_prefix: default_include_prefix(),
            inject_marker: default_inject_marker(),
        }
    }
}

/// `[runner]` section: behaviour of the task runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// `"queue"` or `"cancel"`: what to do with a trigger that arrives for a
    /// task already participating in the active run.
    #[serde(default)]
    pub triggered_while_running_behaviour: crate::engine::TriggerWhileRunningBehaviour,

    /// Maximum number of queued future runs to remember.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Whether watch triggers are suppressed when the watched content's
    /// aggregate hash is unchanged (no-op writes).
    #[serde(default = "default_use_hash")]
    pub use_hash: bool,
}

fn default_queue_length() -> usize {
    1
}

fn default_use_hash() -> bool {
    true
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: Default::default(),
            queue_length: default_queue_length(),
            use_hash: default_use_hash(),
        }
    }
}

/// Top-level configuration as read from TOML, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub serve: ServeSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub runner: RunnerSection,

    /// User overrides for the path table; merged over the built-in defaults.
    #[serde(default)]
    pub paths: BTreeMap<AssetCategory, PathEntry>,
}

/// Validated configuration: the path table is complete for every built-in
/// task, all globs compile, and the task graph is acyclic.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub serve: ServeSection,
    pub build: BuildSection,
    pub runner: RunnerSection,
    paths: BTreeMap<AssetCategory, PathEntry>,
}

impl ConfigFile {
    /// Construct without re-validating. Only `validate` should call this.
    pub(crate) fn new_unchecked(
        serve: ServeSection,
        build: BuildSection,
        runner: RunnerSection,
        paths: BTreeMap<AssetCategory, PathEntry>,
    ) -> Self {
        Self {
            serve,
            build,
            runner,
            paths,
        }
    }

    /// Path-table lookup. Fails fast when a task references a category
    /// without an entry.
    pub fn entry(&self, category: AssetCategory) -> Result<&PathEntry> {
        self.paths.get(&category).ok_or_else(|| {
            AssetpipeError::ConfigError(format!(
                "no [paths.{category}] entry for a task that requires it"
            ))
        })
    }

    /// Raw access for iteration (dry-run output, watch profile building).
    pub fn paths(&self) -> &BTreeMap<AssetCategory, PathEntry> {
        &self.paths
    }

    /// The sprite output path from the svg entry.
    pub fn sprite_path(&self) -> Result<&PathBuf> {
        let svg = self.entry(AssetCategory::Svg)?;
        svg.sprite.as_ref().ok_or_else(|| {
            AssetpipeError::ConfigError(
                "[paths.svg] is missing the `sprite` output path".to_string(),
            )
        })
    }

    /// The partials directory from the html entry.
    pub fn partials_dir(&self) -> Result<&PathBuf> {
        let html = self.entry(AssetCategory::Html)?;
        html.partials.as_ref().ok_or_else(|| {
            AssetpipeError::ConfigError(
                "[paths.html] is missing the `partials` directory".to_string(),
            )
        })
    }
}

/// Built-in path table mirroring the conventional source tree layout.
pub fn default_path_table() -> BTreeMap<AssetCategory, PathEntry> {
    let mut paths = BTreeMap::new();

    paths.insert(
        AssetCategory::Html,
        PathEntry::new("dev/html/*.html", "build")
            .with_partials("dev/html/partials")
            .with_watch("dev/html/**/*.html"),
    );
    paths.insert(
        AssetCategory::Styles,
        PathEntry::new("dev/styles/styles.css", "build/assets/css")
            .with_watch("dev/styles/**/*.css"),
    );
    paths.insert(
        AssetCategory::Scripts,
        PathEntry::new("dev/scripts/scripts.js", "build/assets/js")
            .with_watch("dev/scripts/**/*.js"),
    );
    paths.insert(
        AssetCategory::Vendor,
        PathEntry::new("dev/scripts/vendor/*.js", "build/assets/js/vendor"),
    );
    paths.insert(
        AssetCategory::Images,
        PathEntry::new("dev/media/images/*.{png,jpg,gif}", "build/assets/img"),
    );
    paths.insert(
        AssetCategory::Audio,
        PathEntry::new("dev/media/audio/*.*", "build/assets/aud"),
    );
    paths.insert(
        AssetCategory::Video,
        PathEntry::new("dev/media/videos/*.*", "build/assets/vid"),
    );
    paths.insert(
        AssetCategory::Svg,
        PathEntry::new("dev/media/svg/*.svg", "build/assets/img")
            .with_sprite("build/assets/img/svg.svg"),
    );
    paths.insert(
        AssetCategory::Misc,
        PathEntry::new("dev/extra/root/*", "build"),
    );
    paths.insert(
        AssetCategory::Fonts,
        PathEntry::new("dev/extra/fonts/*", "build/assets/fonts"),
    );

    paths
}
