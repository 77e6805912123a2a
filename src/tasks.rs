// src/tasks.rs

//! The fixed task registry.
//!
//! Unlike a general-purpose runner, the pipeline's task graph is declared in
//! code: each task names the transform it performs ([`TaskKind`]), the tasks
//! it must wait for, and the reload signal its successful completion emits in
//! watch mode. The default sequence is simply "dispatch all DAG roots":
//! `html` waits on `svg`, `misc` waits on the four copy tasks, and everything
//! else runs in parallel.

use crate::config::AssetCategory;

/// The transform a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Change-filtered copy of one asset category.
    Copy(AssetCategory),
    /// Change-filtered copy + lossless recompression of raster images.
    Images,
    /// Optimize SVG icons and aggregate them into the sprite document.
    SvgSprite,
    /// Resolve partials and inject the sprite into top-level pages.
    Html,
    /// Compile, prefix and minify the entry stylesheet.
    Styles,
    /// Bundle, minify and source-map the script entry.
    Scripts,
}

/// Browser-side effect of a task completing successfully in watch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadAction {
    /// Hot-swap stylesheets without reloading the page.
    CssSwap,
    /// Full page reload.
    FullReload,
}

/// Static description of one task in the fixed graph.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub name: &'static str,
    pub kind: TaskKind,
    /// Tasks that must reach a terminal-success state first.
    pub after: &'static [&'static str],
    /// Reload signal emitted after successful completion (watch mode only).
    pub reload: Option<ReloadAction>,
}

impl TaskSpec {
    /// Path-table categories this task reads. The validator fails fast when
    /// any of these is missing an entry.
    pub fn categories(&self) -> &'static [AssetCategory] {
        match self.kind {
            TaskKind::Copy(AssetCategory::Vendor) => &[AssetCategory::Vendor],
            TaskKind::Copy(AssetCategory::Fonts) => &[AssetCategory::Fonts],
            TaskKind::Copy(AssetCategory::Audio) => &[AssetCategory::Audio],
            TaskKind::Copy(AssetCategory::Video) => &[AssetCategory::Video],
            TaskKind::Copy(AssetCategory::Misc) => &[AssetCategory::Misc],
            // A copy task over any other category still reads just that one.
            TaskKind::Copy(AssetCategory::Html) => &[AssetCategory::Html],
            TaskKind::Copy(AssetCategory::Styles) => &[AssetCategory::Styles],
            TaskKind::Copy(AssetCategory::Scripts) => &[AssetCategory::Scripts],
            TaskKind::Copy(AssetCategory::Images) => &[AssetCategory::Images],
            TaskKind::Copy(AssetCategory::Svg) => &[AssetCategory::Svg],
            TaskKind::Images => &[AssetCategory::Images],
            TaskKind::SvgSprite => &[AssetCategory::Svg],
            TaskKind::Html => &[AssetCategory::Html, AssetCategory::Svg],
            TaskKind::Styles => &[AssetCategory::Styles],
            TaskKind::Scripts => &[AssetCategory::Scripts],
        }
    }
}

/// The complete task graph, in dispatch-friendly order.
pub const REGISTRY: &[TaskSpec] = &[
    TaskSpec {
        name: "vendor",
        kind: TaskKind::Copy(AssetCategory::Vendor),
        after: &[],
        reload: None,
    },
    TaskSpec {
        name: "fonts",
        kind: TaskKind::Copy(AssetCategory::Fonts),
        after: &[],
        reload: None,
    },
    TaskSpec {
        name: "audio",
        kind: TaskKind::Copy(AssetCategory::Audio),
        after: &[],
        reload: None,
    },
    TaskSpec {
        name: "video",
        kind: TaskKind::Copy(AssetCategory::Video),
        after: &[],
        reload: None,
    },
    TaskSpec {
        name: "misc",
        kind: TaskKind::Copy(AssetCategory::Misc),
        after: &["vendor", "fonts", "audio", "video"],
        reload: None,
    },
    TaskSpec {
        name: "images",
        kind: TaskKind::Images,
        after: &[],
        reload: None,
    },
    TaskSpec {
        name: "svg",
        kind: TaskKind::SvgSprite,
        after: &[],
        reload: None,
    },
    TaskSpec {
        name: "html",
        kind: TaskKind::Html,
        after: &["svg"],
        reload: Some(ReloadAction::FullReload),
    },
    TaskSpec {
        name: "styles",
        kind: TaskKind::Styles,
        after: &[],
        reload: Some(ReloadAction::CssSwap),
    },
    TaskSpec {
        name: "scripts",
        kind: TaskKind::Scripts,
        after: &[],
        reload: Some(ReloadAction::FullReload),
    },
];

/// Look up a task spec by name.
pub fn spec(name: &str) -> Option<&'static TaskSpec> {
    REGISTRY.iter().find(|t| t.name == name)
}

/// Names of all tasks with no prerequisites (the default dispatch set).
pub fn root_tasks() -> Vec<&'static str> {
    REGISTRY
        .iter()
        .filter(|t| t.after.is_empty())
        .map(|t| t.name)
        .collect()
}
