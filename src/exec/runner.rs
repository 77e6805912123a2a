// src/exec/runner.rs

//! Main executor loop that runs pipeline tasks.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::pipeline::{self, PipelineContext};

/// Spawn the background executor loop.
///
/// The returned `mpsc::Sender<ScheduledTask>` is what the runtime (or
/// `RealExecutorBackend`) uses to dispatch work. Each scheduled task runs on
/// the blocking thread pool; independent tasks in the same DAG run execute
/// concurrently.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    ctx: Arc<PipelineContext>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        while let Some(task) = rx.recv().await {
            let rt_tx = runtime_tx.clone();
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                run_scheduled_task(task, rt_tx, ctx).await;
            });
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}

/// Run one scheduled task to completion and report the outcome.
async fn run_scheduled_task(
    task: ScheduledTask,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    ctx: Arc<PipelineContext>,
) {
    let name = task.name.clone();
    let kind = task.kind;
    let run_id = task.run_id;

    debug!(task = %name, run_id, "starting pipeline task");
    let started = Instant::now();

    let joined = tokio::task::spawn_blocking(move || pipeline::run_task(kind, &ctx)).await;

    let outcome = match joined {
        Ok(Ok(summary)) => {
            info!(
                task = %name,
                run_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                %summary,
                "task finished"
            );
            TaskOutcome::Success
        }
        Ok(Err(err)) => {
            warn!(
                task = %name,
                run_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %err,
                "task failed"
            );
            TaskOutcome::Failed(err.to_string())
        }
        Err(join_err) => {
            warn!(task = %name, run_id, error = %join_err, "task panicked");
            TaskOutcome::Failed(format!("task panicked: {join_err}"))
        }
    };

    let _ = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: name,
            outcome,
        })
        .await;
}
