// tests/runtime_fake_executor.rs

mod common;
use crate::common::{init_tracing, with_timeout, FakeExecutor};

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use assetpipe::dag::Scheduler;
use assetpipe::engine::{
    CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason, TriggerWhileRunningBehaviour,
};
use assetpipe::tasks::{self, REGISTRY};

type TestResult = Result<(), Box<dyn Error>>;

async fn run_once(executor_failing: Option<&str>) -> Vec<String> {
    let scheduler = Scheduler::from_specs(REGISTRY);
    let options = RuntimeOptions {
        exit_when_idle: true,
    };

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let mut executor = FakeExecutor::new(rt_tx.clone(), executed.clone());
    if let Some(task) = executor_failing {
        executor = executor.failing(task);
    }

    for task in tasks::root_tasks() {
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task: task.to_string(),
                reason: TriggerReason::Manual,
            })
            .await
            .unwrap();
    }

    let core = CoreRuntime::new(scheduler, TriggerWhileRunningBehaviour::Queue, 1, options);
    let runtime = Runtime::new(core, rt_rx, executor, None);
    runtime.run().await.unwrap();

    let executed = executed.lock().unwrap();
    executed.clone()
}

#[tokio::test]
async fn default_run_executes_every_task_respecting_the_dag() -> TestResult {
    init_tracing();

    let executed = with_timeout(run_once(None)).await;

    for spec in REGISTRY {
        assert!(
            executed.contains(&spec.name.to_string()),
            "{} never ran",
            spec.name
        );
    }

    let pos = |name: &str| executed.iter().position(|t| t == name).unwrap();
    assert!(pos("svg") < pos("html"));
    assert!(pos("vendor") < pos("misc"));
    assert!(pos("fonts") < pos("misc"));
    assert!(pos("audio") < pos("misc"));
    assert!(pos("video") < pos("misc"));
    Ok(())
}

#[tokio::test]
async fn sprite_failure_skips_html_and_still_exits_cleanly() -> TestResult {
    init_tracing();

    let executed = with_timeout(run_once(Some("svg"))).await;

    assert!(executed.contains(&"svg".to_string()));
    assert!(
        !executed.contains(&"html".to_string()),
        "html must not run after its prerequisite failed"
    );
    assert!(executed.contains(&"styles".to_string()));
    Ok(())
}
