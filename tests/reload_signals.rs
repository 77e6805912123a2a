// tests/reload_signals.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;

use assetpipe::dag::Scheduler;
use assetpipe::engine::{
    CoreCommand, CoreRuntime, RuntimeEvent, RuntimeOptions, TaskOutcome, TriggerReason,
    TriggerWhileRunningBehaviour,
};
use assetpipe::tasks::{ReloadAction, REGISTRY};

type TestResult = Result<(), Box<dyn Error>>;

fn core() -> CoreRuntime {
    CoreRuntime::new(
        Scheduler::from_specs(REGISTRY),
        TriggerWhileRunningBehaviour::Queue,
        1,
        RuntimeOptions {
            exit_when_idle: false,
        },
    )
}

fn trigger(task: &str) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task: task.to_string(),
        reason: TriggerReason::FileWatch,
    }
}

fn completed(task: &str, outcome: TaskOutcome) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task: task.to_string(),
        outcome,
    }
}

fn reload_commands(commands: &[CoreCommand]) -> Vec<ReloadAction> {
    commands
        .iter()
        .filter_map(|c| match c {
            CoreCommand::NotifyReload(action) => Some(*action),
            _ => None,
        })
        .collect()
}

#[test]
fn style_rebuild_swaps_css_without_a_page_reload() -> TestResult {
    init_tracing();
    let mut core = core();

    core.step(trigger("styles"));
    let step = core.step(completed("styles", TaskOutcome::Success));

    assert_eq!(reload_commands(&step.commands), vec![ReloadAction::CssSwap]);
    assert!(step.keep_running);
    Ok(())
}

#[test]
fn script_and_html_rebuilds_issue_full_reloads() -> TestResult {
    init_tracing();
    let mut core = core();

    core.step(trigger("scripts"));
    let step = core.step(completed("scripts", TaskOutcome::Success));
    assert_eq!(
        reload_commands(&step.commands),
        vec![ReloadAction::FullReload]
    );

    // html only reloads after its sprite prerequisite resolves.
    core.step(trigger("svg"));
    let step = core.step(completed("svg", TaskOutcome::Success));
    assert!(reload_commands(&step.commands).is_empty());

    let step = core.step(completed("html", TaskOutcome::Success));
    assert_eq!(
        reload_commands(&step.commands),
        vec![ReloadAction::FullReload]
    );
    Ok(())
}

#[test]
fn copy_tasks_complete_silently() -> TestResult {
    init_tracing();
    let mut core = core();

    core.step(trigger("fonts"));
    let step = core.step(completed("fonts", TaskOutcome::Success));
    assert!(reload_commands(&step.commands).is_empty());
    Ok(())
}

#[test]
fn failure_surfaces_an_error_and_keeps_the_runtime_alive() -> TestResult {
    init_tracing();
    let mut core = core();

    core.step(trigger("styles"));
    let step = core.step(completed(
        "styles",
        TaskOutcome::Failed("unexpected token".to_string()),
    ));

    assert!(reload_commands(&step.commands).is_empty());
    assert!(step.commands.iter().any(|c| matches!(
        c,
        CoreCommand::NotifyError { task, message }
            if task == "styles" && message.contains("unexpected token")
    )));
    assert!(step.keep_running);

    // The next file change still starts a fresh run.
    let step = core.step(trigger("styles"));
    assert!(step
        .commands
        .iter()
        .any(|c| matches!(c, CoreCommand::DispatchTasks(tasks) if tasks[0].name == "styles")));
    Ok(())
}
