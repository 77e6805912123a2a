// src/config/validate.rs

use std::collections::BTreeMap;

use globset::Glob;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{
    default_path_table, AssetCategory, ConfigFile, PathEntry, RawConfigFile,
};
use crate::errors::{AssetpipeError, Result};
use crate::tasks;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetpipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let paths = merge_path_table(raw.paths);

        validate_runner_section(&raw.runner)?;
        validate_path_table(&paths)?;
        validate_task_categories(&paths)?;
        validate_dag()?;

        Ok(ConfigFile::new_unchecked(
            raw.serve, raw.build, raw.runner, paths,
        ))
    }
}

/// User `[paths.*]` entries override the built-in defaults wholesale.
fn merge_path_table(
    overrides: BTreeMap<AssetCategory, PathEntry>,
) -> BTreeMap<AssetCategory, PathEntry> {
    let mut paths = default_path_table();
    for (category, entry) in overrides {
        paths.insert(category, entry);
    }
    paths
}

fn validate_runner_section(runner: &crate::config::model::RunnerSection) -> Result<()> {
    if runner.queue_length == 0 {
        return Err(AssetpipeError::ConfigError(
            "[runner].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Every source and watch glob must compile.
fn validate_path_table(paths: &BTreeMap<AssetCategory, PathEntry>) -> Result<()> {
    for (category, entry) in paths {
        Glob::new(&entry.src).map_err(|e| {
            AssetpipeError::ConfigError(format!(
                "[paths.{category}].src is not a valid glob: {e}"
            ))
        })?;

        for pattern in &entry.watch {
            Glob::new(pattern).map_err(|e| {
                AssetpipeError::ConfigError(format!(
                    "[paths.{category}].watch contains an invalid glob '{pattern}': {e}"
                ))
            })?;
        }
    }
    Ok(())
}

/// Every category a built-in task reads must have a path entry, and the
/// category-specific extras (partials dir, sprite path) must be present.
fn validate_task_categories(paths: &BTreeMap<AssetCategory, PathEntry>) -> Result<()> {
    for task in tasks::REGISTRY {
        for category in task.categories() {
            if !paths.contains_key(category) {
                return Err(AssetpipeError::ConfigError(format!(
                    "task '{}' requires [paths.{category}], which is missing",
                    task.name
                )));
            }
        }
    }

    let svg = &paths[&AssetCategory::Svg];
    if svg.sprite.is_none() {
        return Err(AssetpipeError::ConfigError(
            "[paths.svg] must declare a `sprite` output path".to_string(),
        ));
    }

    let html = &paths[&AssetCategory::Html];
    if html.partials.is_none() {
        return Err(AssetpipeError::ConfigError(
            "[paths.html] must declare a `partials` directory".to_string(),
        ));
    }

    Ok(())
}

/// The registry is declared in code, so a cycle means a programming error;
/// checking here keeps the failure mode a clean configuration error instead
/// of a scheduler hang.
fn validate_dag() -> Result<()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for task in tasks::REGISTRY {
        graph.add_node(task.name);
    }

    for task in tasks::REGISTRY {
        for dep in task.after {
            if tasks::spec(dep).is_none() {
                return Err(AssetpipeError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    task.name, dep
                )));
            }
            graph.add_edge(dep, task.name, ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(AssetpipeError::DagCycle(format!(
            "cycle detected in task DAG involving task '{}'",
            cycle.node_id()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawConfigFile;

    #[test]
    fn defaults_validate() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).expect("defaults must be valid");
        assert!(cfg.entry(AssetCategory::Styles).is_ok());
        assert!(cfg.sprite_path().is_ok());
        assert!(cfg.partials_dir().is_ok());
    }

    #[test]
    fn zero_queue_length_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.runner.queue_length = 0;
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn missing_sprite_path_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.paths.insert(
            AssetCategory::Svg,
            toml::from_str::<PathEntry>(
                r#"
                src = "dev/media/svg/*.svg"
                dest = "build/assets/img"
                "#,
            )
            .unwrap(),
        );
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn bad_glob_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.paths.insert(
            AssetCategory::Fonts,
            toml::from_str::<PathEntry>(
                r#"
                src = "dev/extra/fonts/[*"
                dest = "build/assets/fonts"
                "#,
            )
            .unwrap(),
        );
        assert!(ConfigFile::try_from(raw).is_err());
    }
}
