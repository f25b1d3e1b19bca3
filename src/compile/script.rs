//! Script compilation via oxc (parse + codegen).
//!
//! Scripts are parsed and re-emitted in normalized form; real compression
//! happens later in the `min` stage. Pre-minified vendor files (`*.min.js`)
//! are copied through untouched.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::config::SiteConfig;
use crate::utils::fs::{flatten_copy, list_files_with_ext, write_text};
use crate::utils::path::is_min_stem;

/// Compile every script under `src/scripts` into the output root.
///
/// Returns the number of scripts written.
pub fn compile_scripts(config: &SiteConfig) -> Result<usize> {
    let scripts = list_files_with_ext(&config.build.scripts_dir(), &["js", "mjs"]);
    let output = config.output_dir();

    for script in &scripts {
        if is_min_stem(script) {
            flatten_copy(script, output)?;
            continue;
        }
        compile_one(script, config)?;
    }
    Ok(scripts.len())
}

/// Parse and re-emit a single script to `<output>/<basename>`.
fn compile_one(script: &Path, config: &SiteConfig) -> Result<()> {
    let source = fs::read_to_string(script)
        .with_context(|| format!("failed to read {}", script.display()))?;
    let code = transpile(&source)
        .ok_or_else(|| anyhow!("script parse failed: {}", script.display()))?;

    let name = script
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid script name: {}", script.display()))?;
    write_text(&config.output_dir().join(name), &code)
}

/// Parse JavaScript source and re-emit it. Returns `None` on parse errors.
pub fn transpile(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let code = Codegen::new().build(&ret.program).code;
    Some(code)
}
