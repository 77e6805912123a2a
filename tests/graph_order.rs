// tests/graph_order.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;

use assetpipe::dag::{Scheduler, TaskRunState};
use assetpipe::engine::TaskOutcome;
use assetpipe::tasks::REGISTRY;

type TestResult = Result<(), Box<dyn Error>>;

fn complete_all(scheduler: &mut Scheduler, tasks: &[&str]) {
    for task in tasks {
        scheduler.handle_completion(task, TaskOutcome::Success);
    }
}

#[test]
fn html_waits_for_the_sprite() -> TestResult {
    init_tracing();

    let mut scheduler = Scheduler::from_specs(REGISTRY);

    scheduler.start_new_run();
    let ready = scheduler.handle_trigger("svg");
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].name, "svg");

    // html joined the run as a dependent but isn't ready yet.
    assert_eq!(scheduler.run_state_of("html"), Some(TaskRunState::Pending));

    let ready = scheduler.handle_completion("svg", TaskOutcome::Success);
    let names: Vec<&str> = ready.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["html"]);

    scheduler.handle_completion("html", TaskOutcome::Success);
    assert!(scheduler.is_idle());
    Ok(())
}

#[test]
fn misc_waits_for_all_four_copy_tasks() -> TestResult {
    init_tracing();

    let mut scheduler = Scheduler::from_specs(REGISTRY);

    scheduler.start_new_run();
    for task in ["vendor", "fonts", "audio", "video"] {
        let ready = scheduler.handle_trigger(task);
        assert_eq!(ready.len(), 1, "{task} should be dispatched immediately");
    }
    assert_eq!(scheduler.run_state_of("misc"), Some(TaskRunState::Pending));

    // misc only becomes ready once the last prerequisite finishes.
    assert!(scheduler.handle_completion("vendor", TaskOutcome::Success).is_empty());
    assert!(scheduler.handle_completion("fonts", TaskOutcome::Success).is_empty());
    assert!(scheduler.handle_completion("audio", TaskOutcome::Success).is_empty());

    let ready = scheduler.handle_completion("video", TaskOutcome::Success);
    let names: Vec<&str> = ready.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["misc"]);
    Ok(())
}

#[test]
fn sprite_failure_fails_html_but_not_the_rest_of_the_run() -> TestResult {
    init_tracing();

    let mut scheduler = Scheduler::from_specs(REGISTRY);

    scheduler.start_new_run();
    scheduler.handle_trigger("svg");
    scheduler.handle_trigger("styles");

    let ready = scheduler.handle_completion("svg", TaskOutcome::Failed("bad svg".into()));
    assert!(ready.is_empty(), "no dependent should run after a failure");
    assert_eq!(
        scheduler.run_state_of("html"),
        Some(TaskRunState::DoneFailed)
    );

    // The unrelated branch still runs to completion.
    assert_eq!(
        scheduler.run_state_of("styles"),
        Some(TaskRunState::Running)
    );
    scheduler.handle_completion("styles", TaskOutcome::Success);
    assert!(scheduler.is_idle());
    Ok(())
}

#[test]
fn full_default_run_goes_idle_after_every_task_completes() -> TestResult {
    init_tracing();

    let mut scheduler = Scheduler::from_specs(REGISTRY);

    scheduler.start_new_run();
    let mut dispatched: Vec<String> = Vec::new();
    for spec in REGISTRY.iter().filter(|s| s.after.is_empty()) {
        for task in scheduler.handle_trigger(spec.name) {
            dispatched.push(task.name);
        }
    }

    // Roots dispatch immediately; misc and html wait on prerequisites.
    assert!(dispatched.contains(&"svg".to_string()));
    assert!(dispatched.contains(&"styles".to_string()));
    assert!(!dispatched.contains(&"misc".to_string()));
    assert!(!dispatched.contains(&"html".to_string()));

    complete_all(
        &mut scheduler,
        &["vendor", "fonts", "audio", "video", "images", "styles", "scripts"],
    );
    assert!(!scheduler.is_idle());

    let ready = scheduler.handle_completion("svg", TaskOutcome::Success);
    assert_eq!(ready[0].name, "html");

    complete_all(&mut scheduler, &["misc", "html"]);
    assert!(scheduler.is_idle());
    Ok(())
}
