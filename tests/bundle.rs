// tests/bundle.rs

mod common;
use crate::common::{init_tracing, ProjectBuilder};

use std::error::Error;
use std::fs;
use std::sync::Mutex;

use assetpipe::errors::AssetpipeError;
use assetpipe::pipeline::{scripts, ModuleCache};

type TestResult = Result<(), Box<dyn Error>>;

const ENTRY: &str = r#"
var greet = require('./lib/greet.js');
var config = require('./lib/config');
document.title = greet(config.name);
"#;

const GREET: &str = r#"
module.exports = function (name) {
    return 'hello ' + name;
};
"#;

const CONFIG: &str = r#"
module.exports = { name: 'assetpipe' };
"#;

fn project() -> ProjectBuilder {
    ProjectBuilder::new()
        .file("dev/scripts/scripts.js", ENTRY)
        .file("dev/scripts/lib/greet.js", GREET)
        .file("dev/scripts/lib/config/index.js", CONFIG)
}

#[test]
fn bundle_pulls_in_every_reachable_module() -> TestResult {
    init_tracing();

    let project = project();
    let cache = Mutex::new(ModuleCache::default());

    let summary = scripts::run(&project.config(), &cache)?;
    assert_eq!(summary.modules, 3);
    assert_eq!(summary.reused, 0);

    let bundle = fs::read_to_string(project.path("build/assets/js/scripts.min.js"))?;
    assert!(bundle.contains("hello "));
    assert!(bundle.contains("assetpipe"));
    assert!(bundle.contains("sourceMappingURL=../maps/scripts.min.js.map"));
    assert!(project.path("build/assets/maps/scripts.min.js.map").exists());
    Ok(())
}

#[test]
fn unchanged_modules_come_from_the_cache_on_rebuild() -> TestResult {
    init_tracing();

    let project = project();
    let cache = Mutex::new(ModuleCache::default());
    let config = project.config();

    scripts::run(&config, &cache)?;
    let second = scripts::run(&config, &cache)?;

    assert_eq!(second.modules, 3);
    assert_eq!(second.reused, 3);
    Ok(())
}

#[test]
fn edited_module_is_rehashed_while_the_rest_stays_cached() -> TestResult {
    init_tracing();

    let project = project();
    let cache = Mutex::new(ModuleCache::default());
    let config = project.config();

    scripts::run(&config, &cache)?;

    fs::write(
        project.path("dev/scripts/lib/greet.js"),
        "module.exports = function (name) { return 'hi ' + name; };\n",
    )?;

    let summary = scripts::run(&config, &cache)?;
    assert_eq!(summary.modules, 3);
    assert_eq!(summary.reused, 2);

    let bundle = fs::read_to_string(project.path("build/assets/js/scripts.min.js"))?;
    assert!(bundle.contains("hi "));
    Ok(())
}

#[test]
fn commented_out_requires_are_not_bundled() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new().file(
        "dev/scripts/scripts.js",
        "// var removed = require('./removed.js');\n\
         /* var also = require(\"./never-existed\"); */\n\
         document.title = 'no deps';\n",
    );
    let cache = Mutex::new(ModuleCache::default());

    let summary = scripts::run(&project.config(), &cache)?;
    assert_eq!(summary.modules, 1);

    let bundle = fs::read_to_string(project.path("build/assets/js/scripts.min.js"))?;
    assert!(!bundle.contains("removed.js"));
    Ok(())
}

#[test]
fn syntax_error_names_the_offending_module() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new()
        .file("dev/scripts/scripts.js", "var broken = require('./broken.js');\n")
        .file("dev/scripts/broken.js", "function ( { nope\n");
    let cache = Mutex::new(ModuleCache::default());

    let err = scripts::run(&project.config(), &cache).unwrap_err();
    match err {
        AssetpipeError::ScriptBundle { file, .. } => assert!(file.contains("broken.js")),
        other => panic!("expected ScriptBundle, got {other}"),
    }
    Ok(())
}

#[test]
fn bare_specifiers_are_rejected() -> TestResult {
    init_tracing();

    let project = ProjectBuilder::new()
        .file("dev/scripts/scripts.js", "var _ = require('lodash');\n");
    let cache = Mutex::new(ModuleCache::default());

    assert!(scripts::run(&project.config(), &cache).is_err());
    Ok(())
}
