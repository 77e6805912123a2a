// tests/html_include.rs

mod common;
use crate::common::{init_tracing, ProjectBuilder};

use std::error::Error;
use std::fs;

use assetpipe::errors::AssetpipeError;
use assetpipe::pipeline::html;

type TestResult = Result<(), Box<dyn Error>>;

const SPRITE: &str =
    "<svg xmlns=\"http://www.w3.org/2000/svg\" style=\"display:none\"><symbol id=\"logo\"/></svg>\n";

#[test]
fn includes_resolve_and_sprite_is_injected() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new()
        .file(
            "dev/html/index.html",
            "<body>\n<!-- inject:svg -->\n@@include(header.html)\n<main>content</main>\n</body>\n",
        )
        .file(
            "dev/html/partials/header.html",
            "<header>\n@@include(nav.html)\n</header>\n",
        )
        .file("dev/html/partials/nav.html", "<nav>links</nav>\n")
        .file("build/assets/img/svg.svg", SPRITE);

    let summary = html::run(&project.config())?;
    assert_eq!(summary.pages, 1);

    let output = fs::read_to_string(project.path("build/index.html"))?;
    assert!(output.contains("<nav>links</nav>"));
    assert!(output.contains("<symbol id=\"logo\"/>"));
    assert!(!output.contains("@@include"));
    assert!(!output.contains("<!-- inject:svg -->"));
    Ok(())
}

#[test]
fn partials_are_never_compiled_standalone() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new()
        .file("dev/html/index.html", "<body>page</body>\n")
        .file("dev/html/partials/header.html", "<header/>\n")
        .file("build/assets/img/svg.svg", SPRITE);

    let summary = html::run(&project.config())?;
    assert_eq!(summary.pages, 1);
    assert!(!project.path("build/header.html").exists());
    Ok(())
}

#[test]
fn missing_partial_names_both_files() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new()
        .file("dev/html/index.html", "@@include(ghost.html)\n")
        .file("dev/html/partials/.keep", "")
        .file("build/assets/img/svg.svg", SPRITE);

    let err = html::run(&project.config()).unwrap_err();
    match err {
        AssetpipeError::MissingPartial { partial, page } => {
            assert_eq!(partial, "ghost.html");
            assert!(page.contains("index.html"));
        }
        other => panic!("expected MissingPartial, got {other}"),
    }
    Ok(())
}

#[test]
fn absent_sprite_degrades_to_an_empty_injection() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new()
        .file("dev/html/index.html", "<body><!-- inject:svg --></body>\n")
        .file("dev/html/partials/.keep", "");

    let summary = html::run(&project.config())?;
    assert_eq!(summary.pages, 1);

    let output = fs::read_to_string(project.path("build/index.html"))?;
    assert!(!output.contains("<!-- inject:svg -->"));
    Ok(())
}
