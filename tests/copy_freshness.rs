// tests/copy_freshness.rs

mod common;
use crate::common::{init_tracing, ProjectBuilder};

use std::error::Error;
use std::fs;

use assetpipe::config::AssetCategory;
use assetpipe::pipeline::copy;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn unchanged_sources_are_not_rewritten() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new()
        .file("dev/extra/fonts/body.woff2", "fake font bytes")
        .file("dev/extra/fonts/heading.woff2", "more fake font bytes");
    let config = project.config();
    let entry = config.entry(AssetCategory::Fonts)?;

    let first = copy::run(entry)?;
    assert_eq!(first.copied, 2);
    assert_eq!(first.skipped, 0);

    let dest = project.path("build/assets/fonts/body.woff2");
    let mtime_after_first = fs::metadata(&dest)?.modified()?;

    let second = copy::run(entry)?;
    assert_eq!(second.copied, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(fs::metadata(&dest)?.modified()?, mtime_after_first);
    Ok(())
}

#[test]
fn touched_source_is_copied_again() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new().file("dev/extra/root/robots.txt", "User-agent: *\n");
    let config = project.config();
    let entry = config.entry(AssetCategory::Misc)?;

    copy::run(entry)?;

    // Rewrite with a future mtime so the destination is definitely stale.
    let src = project.path("dev/extra/root/robots.txt");
    fs::write(&src, "User-agent: *\nDisallow: /drafts\n")?;
    let future = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
    let file = fs::File::open(&src)?;
    file.set_modified(future)?;

    let second = copy::run(entry)?;
    assert_eq!(second.copied, 1);

    let copied = fs::read_to_string(project.path("build/robots.txt"))?;
    assert!(copied.contains("Disallow: /drafts"));
    Ok(())
}

#[test]
fn empty_category_copies_nothing() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new();
    fs::create_dir_all(project.path("dev/extra/fonts"))?;
    let config = project.config();
    let entry = config.entry(AssetCategory::Fonts)?;

    let summary = copy::run(entry)?;
    assert_eq!(summary.copied, 0);
    assert_eq!(summary.skipped, 0);
    Ok(())
}
