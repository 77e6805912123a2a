// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod reload;
pub mod serve;
pub mod tasks;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::ConfigFile;
use crate::dag::Scheduler;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::AssetpipeError;
use crate::exec::RealExecutorBackend;
use crate::pipeline::PipelineContext;
use crate::tasks::REGISTRY;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - scheduler / queue / runtime
/// - the in-process task executor
/// - (watch mode) file watcher, dev server and live-reload hub
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    // Fixed DAG + scheduler.
    let scheduler = Scheduler::from_specs(REGISTRY);

    let behaviour = cfg.runner.triggered_while_running_behaviour;
    let queue_length = cfg.runner.queue_length;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // In-process executor sharing one pipeline context across tasks.
    let ctx = Arc::new(PipelineContext::new(cfg.clone()));
    let executor = RealExecutorBackend::new(rt_tx.clone(), Arc::clone(&ctx));

    // Watcher + dev server + reload hub (disabled in --once mode).
    let (reload_hub, _watcher_handle) = if !args.once {
        let (hub, ws_port) =
            reload::start_reload_server(&cfg.serve.host, cfg.serve.port.saturating_add(1))?;

        serve::start_http_server(
            &cfg.serve.host,
            cfg.serve.port,
            cfg.build.output_dir.clone(),
            Some(ws_port),
        )?;

        let profiles = watch::build_profiles_from_config(&cfg)?;
        let root_dir = config_root_dir(&config_path);
        let watch_dir = root_dir.join(&cfg.build.source_dir);
        let handle = watch::spawn_watcher(root_dir, watch_dir, profiles, rt_tx.clone())?;

        (Some(hub), Some(handle))
    } else {
        (None, None)
    };

    // Ctrl-C triggers graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Seed initial triggers: one named task, or all DAG roots.
    let seeds = seed_tasks(&args)?;
    info!(?seeds, "initial tasks to trigger at startup");

    for task in seeds {
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::Manual,
            })
            .await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    // Construct the pure core runtime (single source of truth for semantics).
    let core = CoreRuntime::new(scheduler, behaviour, queue_length, options);

    // Construct the async IO shell around the core.
    let runtime = Runtime::new(core, rt_rx, executor, reload_hub);
    Ok(runtime.run().await?)
}

/// Figure out a sensible project root for watching.
///
/// - If the config path has a non-empty parent (e.g. "configs/Assetpipe.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Assetpipe.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Tasks to trigger at startup: `--task NAME` selects one (its dependents
/// follow through the DAG), otherwise every DAG root is dispatched.
fn seed_tasks(args: &CliArgs) -> Result<Vec<String>> {
    match &args.task {
        Some(name) => {
            if tasks::spec(name).is_none() {
                return Err(AssetpipeError::TaskNotFound(name.clone()).into());
            }
            Ok(vec![name.clone()])
        }
        None => Ok(tasks::root_tasks()
            .into_iter()
            .map(|s| s.to_string())
            .collect()),
    }
}

/// Simple dry-run output: print tasks, deps and the path table.
fn print_dry_run(cfg: &ConfigFile) {
    println!("assetpipe dry-run");
    println!(
        "  runner.triggered_while_running_behaviour = {:?}",
        cfg.runner.triggered_while_running_behaviour
    );
    println!("  runner.queue_length = {}", cfg.runner.queue_length);
    println!("  runner.use_hash = {}", cfg.runner.use_hash);
    println!(
        "  serve = http://{}:{}/ (output: {})",
        cfg.serve.host,
        cfg.serve.port,
        cfg.build.output_dir.display()
    );
    println!();

    println!("tasks ({}):", REGISTRY.len());
    for spec in REGISTRY {
        println!("  - {}", spec.name);
        if !spec.after.is_empty() {
            println!("      after: {:?}", spec.after);
        }
        if let Some(reload) = spec.reload {
            println!("      reload: {reload:?}");
        }
    }
    println!();

    println!("paths ({}):", cfg.paths().len());
    for (category, entry) in cfg.paths() {
        println!("  - {category}: {} -> {}", entry.src, entry.dest.display());
        if !entry.watch.is_empty() {
            println!("      watch: {:?}", entry.watch);
        }
    }
}
