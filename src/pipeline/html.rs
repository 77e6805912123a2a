// src/pipeline/html.rs

//! HTML assembly: include resolution plus sprite injection.
//!
//! Top-level pages come from the html source glob; anything inside the
//! partials directory is never compiled standalone. A line starting with
//! the include prefix (`@@include(header.html)` by default) is replaced
//! with the named partial's contents, recursively. After include
//! resolution the sprite file's contents are substituted for the inject
//! marker so icons are available inline.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::{AssetCategory, ConfigFile};
use crate::errors::{AssetpipeError, Result};
use crate::pipeline::sources;

/// Hard stop for recursive includes; partials including each other in a
/// loop would otherwise never terminate.
const MAX_INCLUDE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlSummary {
    pub pages: usize,
}

pub fn run(config: &ConfigFile) -> Result<HtmlSummary> {
    let entry = config.entry(AssetCategory::Html)?;
    let partials_dir = config.partials_dir()?;

    let sprite = match fs::read_to_string(config.sprite_path()?) {
        Ok(contents) => contents.trim_end().to_string(),
        Err(err) => {
            warn!(error = %err, "sprite file not readable; injecting nothing");
            String::new()
        }
    };

    fs::create_dir_all(&entry.dest)
        .with_context(|| format!("creating destination {}", entry.dest.display()))?;

    let mut pages = 0usize;

    for page in sources::matching_files(&entry.src)? {
        if page.starts_with(partials_dir) {
            continue;
        }
        let Some(file_name) = page.file_name() else {
            continue;
        };

        let source = fs::read_to_string(&page)
            .with_context(|| format!("reading page {}", page.display()))?;
        let label = page.display().to_string();

        let assembled = resolve_includes(
            &source,
            &label,
            partials_dir,
            &config.build.include_prefix,
            0,
        )?;
        let injected = assembled.replace(&config.build.inject_marker, &sprite);

        let dest = entry.dest.join(file_name);
        fs::write(&dest, injected)
            .with_context(|| format!("writing page {}", dest.display()))?;
        debug!(page = %label, dest = %dest.display(), "assembled page");
        pages += 1;
    }

    Ok(HtmlSummary { pages })
}

/// Replace every include directive line with the named partial's contents.
///
/// `page_label` names the file currently being resolved, for error messages.
fn resolve_includes(
    source: &str,
    page_label: &str,
    partials_dir: &Path,
    prefix: &str,
    depth: usize,
) -> Result<String> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(AssetpipeError::MalformedInclude {
            page: page_label.to_string(),
            line: 0,
            detail: format!("include depth exceeded {MAX_INCLUDE_DEPTH} (include cycle?)"),
        });
    }

    let mut out = String::with_capacity(source.len());

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();
        let Some(directive) = trimmed.strip_prefix(prefix) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };

        let partial_name =
            parse_include(directive).map_err(|detail| AssetpipeError::MalformedInclude {
                page: page_label.to_string(),
                line: idx + 1,
                detail,
            })?;

        let partial_path = partials_dir.join(partial_name);
        let partial_source =
            fs::read_to_string(&partial_path).map_err(|_| AssetpipeError::MissingPartial {
                partial: partial_name.to_string(),
                page: page_label.to_string(),
            })?;

        let resolved = resolve_includes(
            &partial_source,
            &partial_path.display().to_string(),
            partials_dir,
            prefix,
            depth + 1,
        )?;
        out.push_str(&resolved);
    }

    Ok(out)
}

/// Parse the tail of an include directive: `include(name.html)`, with
/// optional quotes and `./` around the name.
fn parse_include(directive: &str) -> std::result::Result<&str, String> {
    let rest = directive
        .trim_start()
        .strip_prefix("include")
        .ok_or_else(|| "expected `include(...)` after the prefix token".to_string())?;
    let rest = rest
        .trim_start()
        .strip_prefix('(')
        .ok_or_else(|| "expected `(` after `include`".to_string())?;
    let (arg, _) = rest
        .split_once(')')
        .ok_or_else(|| "unterminated include directive (missing `)`)".to_string())?;

    let name = arg
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim_start_matches("./");

    if name.is_empty() {
        return Err("empty partial name".to_string());
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_include_accepts_quoted_and_bare_names() {
        assert_eq!(parse_include("include(header.html)"), Ok("header.html"));
        assert_eq!(parse_include("include('./header.html')"), Ok("header.html"));
        assert_eq!(parse_include("include(\"nav.html\")"), Ok("nav.html"));
    }

    #[test]
    fn parse_include_rejects_malformed_directives() {
        assert!(parse_include("incl(header.html)").is_err());
        assert!(parse_include("include(header.html").is_err());
        assert!(parse_include("include()").is_err());
    }

    #[test]
    fn includes_are_resolved_recursively() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let partials = tmp.path().join("partials");
        fs::create_dir_all(&partials)?;
        fs::write(partials.join("outer.html"), "<header>\n@@include(inner.html)\n</header>\n")?;
        fs::write(partials.join("inner.html"), "<nav>links</nav>\n")?;

        let page = "<body>\n@@include(outer.html)\n</body>\n";
        let resolved = resolve_includes(page, "index.html", &partials, "@@", 0)?;

        assert!(resolved.contains("<nav>links</nav>"));
        assert!(!resolved.contains("@@include"));
        Ok(())
    }

    #[test]
    fn missing_partial_is_a_descriptive_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve_includes("@@include(ghost.html)\n", "index.html", tmp.path(), "@@", 0)
            .unwrap_err();
        assert!(matches!(err, AssetpipeError::MissingPartial { .. }));
    }

    #[test]
    fn include_cycles_are_cut_off() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        fs::write(tmp.path().join("loop.html"), "@@include(loop.html)\n")?;

        let err = resolve_includes("@@include(loop.html)\n", "index.html", tmp.path(), "@@", 0)
            .unwrap_err();
        assert!(matches!(err, AssetpipeError::MalformedInclude { .. }));
        Ok(())
    }
}
