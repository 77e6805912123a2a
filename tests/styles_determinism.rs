// tests/styles_determinism.rs

mod common;
use crate::common::{init_tracing, ProjectBuilder};

use std::error::Error;
use std::fs;

use assetpipe::errors::AssetpipeError;
use assetpipe::pipeline::styles;

type TestResult = Result<(), Box<dyn Error>>;

const STYLESHEET: &str = r#"
:root { --accent: #e63946; }

.banner {
    display: flex;
    color: var(--accent);

    & .title {
        font-weight: 700;
        user-select: none;
    }
}
"#;

#[test]
fn style_output_is_minified_with_a_source_map() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new().file("dev/styles/styles.css", STYLESHEET);
    let summary = styles::run(&project.config())?;

    assert_eq!(summary.output, project.path("build/assets/css/styles.min.css"));
    let css = fs::read_to_string(&summary.output)?;
    assert!(css.contains(".banner .title"));
    assert!(css.contains("sourceMappingURL=../maps/styles.min.css.map"));

    let map = fs::read_to_string(project.path("build/assets/maps/styles.min.css.map"))?;
    assert!(map.contains("\"mappings\""));
    Ok(())
}

#[test]
fn recompiling_unchanged_sources_is_byte_identical() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new().file("dev/styles/styles.css", STYLESHEET);
    let config = project.config();

    styles::run(&config)?;
    let first = fs::read(project.path("build/assets/css/styles.min.css"))?;

    styles::run(&config)?;
    let second = fs::read(project.path("build/assets/css/styles.min.css"))?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn broken_stylesheet_reports_a_compile_error() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new().file("dev/styles/styles.css", ".broken { color: ");
    let err = styles::run(&project.config()).unwrap_err();

    match err {
        AssetpipeError::StyleCompile { file, .. } => assert!(file.contains("styles.css")),
        other => panic!("expected StyleCompile, got {other}"),
    }
    Ok(())
}
