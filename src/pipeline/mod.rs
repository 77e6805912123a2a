// src/pipeline/mod.rs

//! The asset transform tasks themselves.
//!
//! Each submodule implements one task body: given the validated
//! configuration, read matching sources, transform, and write into the
//! build tree. Task bodies are synchronous; the executor runs them on the
//! blocking thread pool. [`run_task`] is the single dispatch point the
//! executor calls for every [`TaskKind`].

use std::fmt;
use std::sync::Mutex;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::tasks::TaskKind;

pub mod copy;
pub mod freshness;
pub mod html;
pub mod images;
pub mod scripts;
pub mod sources;
pub mod styles;
pub mod svg;

pub use copy::CopySummary;
pub use html::HtmlSummary;
pub use images::ImageSummary;
pub use scripts::{BundleSummary, ModuleCache};
pub use styles::StyleSummary;
pub use svg::SpriteSummary;

/// Shared state the executor hands to every task body.
///
/// The bundler cache is the only piece of mutable cross-run state; it is
/// only locked by the scripts task, and the scheduler never runs two
/// instances of the same task concurrently.
pub struct PipelineContext {
    pub config: ConfigFile,
    pub bundle_cache: Mutex<ModuleCache>,
}

impl PipelineContext {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            config,
            bundle_cache: Mutex::new(ModuleCache::default()),
        }
    }
}

/// What a finished task reports back, mostly for logging.
#[derive(Debug, Clone)]
pub enum TaskSummary {
    Copy(CopySummary),
    Images(ImageSummary),
    Sprite(SpriteSummary),
    Html(HtmlSummary),
    Styles(StyleSummary),
    Scripts(BundleSummary),
}

impl fmt::Display for TaskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskSummary::Copy(s) => write!(f, "copied {} file(s), {} unchanged", s.copied, s.skipped),
            TaskSummary::Images(s) => write!(
                f,
                "optimized {}, copied {}, {} unchanged",
                s.optimized, s.copied, s.skipped
            ),
            TaskSummary::Sprite(s) => write!(f, "sprite with {} symbol(s)", s.symbols),
            TaskSummary::Html(s) => write!(f, "assembled {} page(s)", s.pages),
            TaskSummary::Styles(s) => write!(f, "wrote {} ({} bytes)", s.output.display(), s.bytes),
            TaskSummary::Scripts(s) => write!(
                f,
                "bundled {} module(s) ({} from cache)",
                s.modules, s.reused
            ),
        }
    }
}

/// Run one task body to completion.
pub fn run_task(kind: TaskKind, ctx: &PipelineContext) -> Result<TaskSummary> {
    match kind {
        TaskKind::Copy(category) => {
            let entry = ctx.config.entry(category)?;
            copy::run(entry).map(TaskSummary::Copy)
        }
        TaskKind::Images => {
            let entry = ctx.config.entry(crate::config::AssetCategory::Images)?;
            images::run(entry).map(TaskSummary::Images)
        }
        TaskKind::SvgSprite => svg::run(&ctx.config).map(TaskSummary::Sprite),
        TaskKind::Html => html::run(&ctx.config).map(TaskSummary::Html),
        TaskKind::Styles => styles::run(&ctx.config).map(TaskSummary::Styles),
        TaskKind::Scripts => scripts::run(&ctx.config, &ctx.bundle_cache).map(TaskSummary::Scripts),
    }
}
