// src/pipeline/styles.rs

//! Style compilation.
//!
//! The entry stylesheet is parsed as modern CSS (nesting, custom
//! properties), lowered and vendor-prefixed against the configured browser
//! matrix, minified, and written as `<stem>.min.css` with a source map in
//! the sibling maps directory. Compile errors are reported per run; the
//! watch loop stays alive.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Features, Targets};
use parcel_sourcemap::SourceMap;
use tracing::debug;

use crate::config::{AssetCategory, ConfigFile};
use crate::errors::{AssetpipeError, Result};
use crate::pipeline::sources;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSummary {
    pub output: PathBuf,
    pub bytes: usize,
}

pub fn run(config: &ConfigFile) -> Result<StyleSummary> {
    let entry = config.entry(AssetCategory::Styles)?;
    let src = sources::entry_file(&entry.src)?;
    let source =
        fs::read_to_string(&src).with_context(|| format!("reading {}", src.display()))?;
    let label = src.display().to_string();

    let browsers = Browsers::from_browserslist(config.build.browsers.iter().map(String::as_str))
        .map_err(|e| {
            AssetpipeError::ConfigError(format!("invalid browser support matrix: {e}"))
        })?;
    // Always flatten nesting; the old browsers in the support matrix need
    // plain selectors regardless of what browserslist resolves to.
    let targets = Targets {
        browsers,
        include: Features::Nesting,
        ..Targets::default()
    };

    let mut source_map = SourceMap::new("/");
    let code = compile(&source, &label, targets, &mut source_map)?;

    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "styles".to_string());
    let out_name = format!("{stem}.min.css");
    let map_name = format!("{out_name}.map");

    fs::create_dir_all(&entry.dest)
        .with_context(|| format!("creating destination {}", entry.dest.display()))?;
    let maps_dir = entry.maps_dir();
    fs::create_dir_all(&maps_dir)
        .with_context(|| format!("creating maps directory {}", maps_dir.display()))?;

    let css = format!("{code}\n/*# sourceMappingURL=../maps/{map_name} */\n");
    let output = entry.dest.join(&out_name);
    fs::write(&output, &css)
        .with_context(|| format!("writing {}", output.display()))?;

    let map_json = source_map
        .to_json(None)
        .map_err(|e| style_error(&label, format!("serializing source map: {e}")))?;
    fs::write(maps_dir.join(&map_name), map_json)
        .with_context(|| format!("writing source map for {out_name}"))?;

    debug!(output = %output.display(), bytes = css.len(), "compiled stylesheet");

    Ok(StyleSummary {
        output,
        bytes: css.len(),
    })
}

/// Parse, lower, prefix and minify one stylesheet.
///
/// Deterministic: the same source and targets always produce identical
/// output bytes.
fn compile(
    source: &str,
    label: &str,
    targets: Targets,
    source_map: &mut SourceMap,
) -> Result<String> {
    let mut sheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: label.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| style_error(label, e.to_string()))?;

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| style_error(label, e.to_string()))?;

    let result = sheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: Some(source_map),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| style_error(label, e.to_string()))?;

    Ok(result.code)
}

fn style_error(label: &str, message: String) -> AssetpipeError {
    AssetpipeError::StyleCompile {
        file: label.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"
        :root { --accent: #ff0000; }
        .card {
            color: var(--accent);
            & .title { font-weight: 700; }
        }
    "#;

    fn compile_once(source: &str) -> Result<String> {
        let mut map = SourceMap::new("/");
        let targets = Targets {
            include: Features::Nesting,
            ..Targets::default()
        };
        compile(source, "test.css", targets, &mut map)
    }

    #[test]
    fn nested_css_compiles_and_minifies() {
        let css = compile_once(NESTED).unwrap();
        assert!(css.contains(".card .title"));
        assert!(!css.contains('\n'));
    }

    #[test]
    fn compiling_twice_is_byte_identical() {
        let first = compile_once(NESTED).unwrap();
        let second = compile_once(NESTED).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn parse_errors_are_style_compile_errors() {
        let err = compile_once(".broken { color: ").unwrap_err();
        assert!(matches!(err, AssetpipeError::StyleCompile { .. }));
    }
}
