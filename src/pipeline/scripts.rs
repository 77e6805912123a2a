// src/pipeline/scripts.rs

//! Script bundling.
//!
//! The entry script statically `require()`s every other module with
//! relative specifiers. The bundler walks that graph, wraps each module in
//! a CommonJS-style closure keyed by a numeric id, concatenates everything
//! with a tiny memoizing `require` runtime, minifies the result with oxc
//! and writes `<stem>.min.js` plus a source map.
//!
//! In watch mode the module cache keeps parse results keyed by content
//! hash, so a rebuild only re-validates and re-scans modules whose bytes
//! actually changed.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use oxc::allocator::Allocator;
use oxc::ast::ast::{Argument, CallExpression, Expression};
use oxc::ast_visit::{walk, Visit};
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use tracing::debug;

use crate::config::{AssetCategory, ConfigFile};
use crate::errors::{AssetpipeError, Result};
use crate::pipeline::sources;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSummary {
    /// Modules in the bundle, entry included.
    pub modules: usize,
    /// Modules whose cached scan was reused because their content hash was
    /// unchanged.
    pub reused: usize,
}

/// Per-module scan results, kept across watch-mode rebuilds.
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: HashMap<PathBuf, CachedModule>,
}

impl ModuleCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
struct CachedModule {
    hash: blake3::Hash,
    source: String,
    /// Specifier as written in the source, paired with the resolved
    /// canonical path.
    deps: Vec<(String, PathBuf)>,
}

pub fn run(config: &ConfigFile, cache: &Mutex<ModuleCache>) -> Result<BundleSummary> {
    let entry = config.entry(AssetCategory::Scripts)?;
    let entry_path = sources::entry_file(&entry.src)?;
    let entry_path = fs::canonicalize(&entry_path)
        .with_context(|| format!("resolving {}", entry_path.display()))?;

    // Recover the cache even if a previous bundle panicked mid-run; every
    // cached entry is internally consistent on its own.
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut reused = 0usize;
    collect(&entry_path, &mut cache, &mut order, &mut seen, &mut reused)?;

    let bundle = assemble(&order, &cache);

    let stem = entry_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scripts".to_string());
    let out_name = format!("{stem}.min.js");
    let map_name = format!("{out_name}.map");

    let (code, map_json) = minify_bundle(&bundle, &entry_path)?;

    fs::create_dir_all(&entry.dest)
        .with_context(|| format!("creating destination {}", entry.dest.display()))?;
    let maps_dir = entry.maps_dir();
    fs::create_dir_all(&maps_dir)
        .with_context(|| format!("creating maps directory {}", maps_dir.display()))?;

    let output = entry.dest.join(&out_name);
    let js = format!("{code}\n//# sourceMappingURL=../maps/{map_name}\n");
    fs::write(&output, js).with_context(|| format!("writing {}", output.display()))?;

    if let Some(map_json) = map_json {
        fs::write(maps_dir.join(&map_name), map_json)
            .with_context(|| format!("writing source map for {out_name}"))?;
    }

    debug!(
        output = %output.display(),
        modules = order.len(),
        reused,
        "bundled scripts"
    );

    Ok(BundleSummary {
        modules: order.len(),
        reused,
    })
}

/// Depth-first walk of the require graph starting at `path`.
///
/// `order` collects canonical module paths in discovery order; the entry
/// module therefore always gets id 0. Circular requires are tolerated the
/// way CommonJS tolerates them (the memoizing runtime returns the
/// partially built exports object).
fn collect(
    path: &Path,
    cache: &mut ModuleCache,
    order: &mut Vec<PathBuf>,
    seen: &mut HashSet<PathBuf>,
    reused: &mut usize,
) -> Result<()> {
    if !seen.insert(path.to_path_buf()) {
        return Ok(());
    }
    order.push(path.to_path_buf());

    let deps = load_module(path, cache, reused)?;
    for (_, target) in deps {
        collect(&target, cache, order, seen, reused)?;
    }
    Ok(())
}

/// Load one module, reusing the cached scan when the content is unchanged.
fn load_module(
    path: &Path,
    cache: &mut ModuleCache,
    reused: &mut usize,
) -> Result<Vec<(String, PathBuf)>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading module {}", path.display()))?;
    let hash = blake3::hash(source.as_bytes());

    if let Some(cached) = cache.entries.get(path) {
        if cached.hash == hash {
            *reused += 1;
            return Ok(cached.deps.clone());
        }
    }

    let mut deps = Vec::new();
    for spec in scan_requires(path, &source)? {
        let target = resolve(&spec, path)?;
        deps.push((spec, target));
    }

    cache.entries.insert(
        path.to_path_buf(),
        CachedModule {
            hash,
            source,
            deps: deps.clone(),
        },
    );

    Ok(deps)
}

/// Parse a single module and collect its static `require()` specifiers.
///
/// Parsing per module means syntax errors are reported against the file
/// they live in, not against the concatenated bundle. Walking the AST for
/// the call expressions (rather than scanning the raw text) means requires
/// inside comments or string literals are never treated as dependencies.
fn scan_requires(path: &Path, source: &str) -> Result<Vec<String>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AssetpipeError::ScriptBundle {
            file: path.display().to_string(),
            message,
        });
    }

    let mut collector = RequireCollector::default();
    collector.visit_program(&ret.program);
    Ok(collector.specs)
}

/// Collects the string argument of every `require('...')` call, in source
/// order. Dynamic requires (non-literal arguments) are left alone.
#[derive(Default)]
struct RequireCollector {
    specs: Vec<String>,
}

impl<'a> Visit<'a> for RequireCollector {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee {
            if callee.name == "require" && call.arguments.len() == 1 {
                if let Argument::StringLiteral(literal) = &call.arguments[0] {
                    self.specs.push(literal.value.to_string());
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}

/// Resolve a require specifier relative to the requiring module.
fn resolve(spec: &str, from: &Path) -> Result<PathBuf> {
    if !spec.starts_with("./") && !spec.starts_with("../") {
        return Err(AssetpipeError::ScriptBundle {
            file: from.display().to_string(),
            message: format!(
                "cannot resolve '{spec}': only relative requires are bundled"
            ),
        });
    }

    let dir = from.parent().unwrap_or_else(|| Path::new("."));
    let joined = dir.join(spec);

    let candidates = [
        joined.clone(),
        PathBuf::from(format!("{}.js", joined.display())),
        joined.join("index.js"),
    ];

    for candidate in &candidates {
        if candidate.is_file() {
            return fs::canonicalize(candidate)
                .with_context(|| format!("resolving {}", candidate.display()))
                .map_err(Into::into);
        }
    }

    Err(AssetpipeError::ScriptBundle {
        file: from.display().to_string(),
        message: format!("cannot find module '{spec}'"),
    })
}

/// Concatenate all modules into one self-executing bundle with a memoizing
/// `require` runtime, browserify style.
fn assemble(order: &[PathBuf], cache: &ModuleCache) -> String {
    let ids: HashMap<&Path, usize> = order
        .iter()
        .enumerate()
        .map(|(id, path)| (path.as_path(), id))
        .collect();

    let mut out = String::new();
    out.push_str("(function() {\nvar __modules = {\n");

    for (id, path) in order.iter().enumerate() {
        let Some(module) = cache.entries.get(path) else {
            continue;
        };

        let mut dep_map = String::new();
        for (spec, target) in &module.deps {
            if let Some(target_id) = ids.get(target.as_path()) {
                if !dep_map.is_empty() {
                    dep_map.push(',');
                }
                let key = serde_json::to_string(spec).unwrap_or_else(|_| "\"\"".to_string());
                let _ = write!(dep_map, "{key}:{target_id}");
            }
        }

        let _ = write!(
            out,
            "{id}: [function(require, module, exports) {{\n{}\n}}, {{{dep_map}}}],\n",
            module.source
        );
    }

    out.push_str("};\n");
    out.push_str(
        "var __cache = {};\n\
         function __require(id) {\n\
           if (__cache[id]) return __cache[id].exports;\n\
           var m = __cache[id] = { exports: {} };\n\
           var def = __modules[id];\n\
           function localRequire(spec) {\n\
             var mapped = def[1][spec];\n\
             if (mapped === undefined) throw new Error(\"Cannot find module '\" + spec + \"'\");\n\
             return __require(mapped);\n\
           }\n\
           def[0].call(m.exports, localRequire, m, m.exports);\n\
           return m.exports;\n\
         }\n\
         __require(0);\n\
         })();\n",
    );

    out
}

/// Minify the assembled bundle and emit its source map.
fn minify_bundle(bundle: &str, entry_path: &Path) -> Result<(String, Option<String>)> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, bundle, SourceType::cjs()).parse();
    if !ret.errors.is_empty() {
        // The per-module syntax check passed, so this indicates the
        // assembled wrapper itself is broken.
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AssetpipeError::ScriptBundle {
            file: entry_path.display().to_string(),
            message: format!("assembled bundle failed to parse: {message}"),
        });
    }

    let mut program = ret.program;
    let minified = Minifier::new(MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    })
    .minify(&allocator, &mut program);

    let generated = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: Some(entry_path.to_path_buf()),
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program);

    let map_json = generated.map.map(|map| map.to_json_string());
    Ok((generated.code, map_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_finds_static_requires() {
        let src = "var a = require('./a');\nconst b = require(\"../lib/b.js\");\n";
        let specs = scan_requires(Path::new("entry.js"), src).unwrap();
        assert_eq!(specs, vec!["./a", "../lib/b.js"]);
    }

    #[test]
    fn scan_ignores_requires_in_comments_and_strings() {
        let src = "\
// var gone = require('./removed.js');\n\
/* require('./also-gone.js') */\n\
var label = \"require('./fake.js')\";\n\
module.exports = label;\n";
        let specs = scan_requires(Path::new("entry.js"), src).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn scan_skips_dynamic_requires() {
        let src = "var name = './a';\nvar a = require(name);\nvar b = require('./b');\n";
        let specs = scan_requires(Path::new("entry.js"), src).unwrap();
        assert_eq!(specs, vec!["./b"]);
    }

    #[test]
    fn resolve_tries_js_extension_and_index() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path();
        fs::write(root.join("entry.js"), "")?;
        fs::write(root.join("helper.js"), "")?;
        fs::create_dir_all(root.join("widgets"))?;
        fs::write(root.join("widgets/index.js"), "")?;

        let from = root.join("entry.js");
        assert!(resolve("./helper", &from).is_ok());
        assert!(resolve("./helper.js", &from).is_ok());
        assert!(resolve("./widgets", &from).is_ok());
        assert!(resolve("./ghost", &from).is_err());
        Ok(())
    }

    #[test]
    fn bare_specifiers_are_rejected() {
        let err = resolve("lodash", Path::new("entry.js")).unwrap_err();
        assert!(matches!(err, AssetpipeError::ScriptBundle { .. }));
    }

    #[test]
    fn syntax_errors_name_the_offending_module() {
        let err = scan_requires(Path::new("dev/scripts/broken.js"), "function (").unwrap_err();
        match err {
            AssetpipeError::ScriptBundle { file, .. } => {
                assert!(file.contains("broken.js"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unchanged_modules_are_reused_from_cache() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path();
        fs::write(root.join("entry.js"), "var a = require('./a');\n")?;
        fs::write(root.join("a.js"), "module.exports = 1;\n")?;
        let entry = fs::canonicalize(root.join("entry.js"))?;

        let mut cache = ModuleCache::default();
        let mut order = Vec::new();
        let mut reused = 0;
        collect(&entry, &mut cache, &mut order, &mut HashSet::new(), &mut reused)?;
        assert_eq!(order.len(), 2);
        assert_eq!(reused, 0);

        let mut order = Vec::new();
        let mut reused = 0;
        collect(&entry, &mut cache, &mut order, &mut HashSet::new(), &mut reused)?;
        assert_eq!(reused, 2);
        Ok(())
    }
}
