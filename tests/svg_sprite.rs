// tests/svg_sprite.rs

mod common;
use crate::common::{init_tracing, ProjectBuilder};

use std::error::Error;
use std::fs;

use assetpipe::pipeline::svg;

type TestResult = Result<(), Box<dyn Error>>;

const BOX_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
  <path d="M4 4h16v16H4z" fill="none" stroke="currentColor"/>
</svg>"#;

const DOT_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">
  <circle cx="5" cy="5" r="4"/>
</svg>"#;

#[test]
fn sprite_aggregates_one_symbol_per_icon() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new()
        .file("dev/media/svg/box.svg", BOX_ICON)
        .file("dev/media/svg/dot.svg", DOT_ICON);

    let summary = svg::run(&project.config())?;
    assert_eq!(summary.symbols, 2);

    let sprite = fs::read_to_string(project.path("build/assets/img/svg.svg"))?;
    assert!(sprite.starts_with("<svg"));
    assert!(sprite.contains("style=\"display:none\""));
    assert!(sprite.contains("<symbol id=\"box\""));
    assert!(sprite.contains("<symbol id=\"dot\""));
    assert!(sprite.contains("viewBox=\"0 0 10 10\""));
    // Inner documents must not keep their own <svg> wrapper.
    assert_eq!(sprite.matches("<svg").count(), 1);
    Ok(())
}

#[test]
fn empty_icon_directory_still_writes_a_sprite() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new();
    fs::create_dir_all(project.path("dev/media/svg"))?;

    let summary = svg::run(&project.config())?;
    assert_eq!(summary.symbols, 0);
    assert!(project.path("build/assets/img/svg.svg").exists());
    Ok(())
}

#[test]
fn unparsable_icon_fails_the_task() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new().file("dev/media/svg/broken.svg", "<p>not svg</p>");

    assert!(svg::run(&project.config()).is_err());
    Ok(())
}
