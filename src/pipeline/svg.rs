// src/pipeline/svg.rs

//! SVG optimization and sprite generation.
//!
//! Every matching source SVG is run through usvg, which normalizes the
//! document while keeping `viewBox`, stroke and fill intact. The optimized
//! documents are then rewritten as `<symbol>` entries keyed by source file
//! stem and aggregated into a single sprite written to the configured
//! sprite path. HTML assembly inlines that sprite so pages can reference
//! icons with `<use href="#name">`.

use std::fs;

use anyhow::Context;
use tracing::debug;

use crate::config::{AssetCategory, ConfigFile};
use crate::errors::Result;
use crate::pipeline::sources;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSummary {
    pub symbols: usize,
}

pub fn run(config: &ConfigFile) -> Result<SpriteSummary> {
    let entry = config.entry(AssetCategory::Svg)?;
    let sprite_path = config.sprite_path()?;
    let files = sources::matching_files(&entry.src)?;

    let mut symbols = String::new();
    let mut count = 0usize;

    for src in &files {
        let Some(stem) = src.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let data = fs::read(src).with_context(|| format!("reading {}", src.display()))?;
        let symbol =
            to_symbol(&data, stem).with_context(|| format!("optimizing {}", src.display()))?;
        symbols.push_str(&symbol);
        count += 1;
        debug!(file = %src.display(), id = stem, "added sprite symbol");
    }

    if let Some(parent) = sprite_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating sprite directory {}", parent.display()))?;
    }

    let sprite = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" style=\"display:none\">{symbols}</svg>\n"
    );
    fs::write(sprite_path, sprite)
        .with_context(|| format!("writing sprite {}", sprite_path.display()))?;

    Ok(SpriteSummary { symbols: count })
}

/// Optimize one SVG document and rewrite it as a `<symbol>` addressable by
/// the source file's stem.
fn to_symbol(data: &[u8], id: &str) -> anyhow::Result<String> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .context("parsing SVG document")?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    let optimized = tree.to_string(&write_options);

    let body = inner_markup(&optimized).unwrap_or("");

    match extract_attr(&optimized, "viewBox=\"") {
        Some(view_box) => Ok(format!(
            "<symbol id=\"{id}\" viewBox=\"{view_box}\">{body}</symbol>"
        )),
        None => Ok(format!("<symbol id=\"{id}\">{body}</symbol>")),
    }
}

/// Content between the outer `<svg ...>` tag and its closing tag.
fn inner_markup(svg: &str) -> Option<&str> {
    let open_end = svg.find('>')? + 1;
    let close = svg.rfind("</svg>")?;
    if close < open_end {
        return None;
    }
    Some(&svg[open_end..close])
}

/// Extract an attribute value between the given prefix and the closing quote.
fn extract_attr<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let start = s.find(prefix)? + prefix.len();
    let end = start + s[start..].find('"')?;
    Some(&s[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
        <path d="M4 4h16v16H4z" fill="none" stroke="currentColor"/>
    </svg>"#;

    #[test]
    fn symbol_keeps_viewbox_and_drops_outer_tag() {
        let symbol = to_symbol(ICON.as_bytes(), "box").unwrap();
        assert!(symbol.starts_with("<symbol id=\"box\""));
        assert!(symbol.contains("viewBox=\"0 0 24 24\""));
        assert!(!symbol.contains("<svg"));
        assert!(symbol.ends_with("</symbol>"));
    }

    #[test]
    fn malformed_svg_is_rejected() {
        assert!(to_symbol(b"<div>not svg</div>", "bad").is_err());
    }

    #[test]
    fn inner_markup_extracts_children() {
        assert_eq!(inner_markup("<svg a=\"b\"><g/></svg>"), Some("<g/>"));
        assert_eq!(inner_markup("no svg here"), None);
    }
}
