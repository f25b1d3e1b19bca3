//! Asset minification for JS and CSS files.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Minified siblings are
//! written next to the originals with a `.min` marker; a file that fails to
//! minify is carried through unminified so the pipeline never loses content.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::config::SiteConfig;
use crate::debug;
use crate::utils::fs::{list_top_level, write_text};
use crate::utils::path::{extension, is_min_stem};

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

/// Write `.min` siblings for every top-level output file with the given
/// extension (`css` or `js`), skipping files already carrying the marker.
///
/// Returns the number of siblings written.
pub fn minify_outputs(config: &SiteConfig, ext: &str) -> Result<usize> {
    let targets: Vec<PathBuf> = list_top_level(config.output_dir())
        .into_iter()
        .filter(|p| extension(p) == ext && !is_min_stem(p))
        .collect();

    for path in &targets {
        minify_one(path, ext)?;
    }
    Ok(targets.len())
}

/// Write the `.min` sibling of one file.
fn minify_one(path: &Path, ext: &str) -> Result<()> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let minified = match ext {
        "js" => minify_js(&source),
        "css" => minify_css(&source),
        _ => None,
    };
    let minified = minified.unwrap_or_else(|| {
        debug!("min"; "minify failed, keeping source: {}", path.display());
        source.clone()
    });

    write_text(&min_sibling(path), &minified)
}

/// `dist/app.css` → `dist/app.min.css`.
fn min_sibling(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = extension(path);
    path.with_file_name(format!("{stem}.min.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minify_js() {
        let code = minify_js("const answer = 40 + 2; console.log(answer);").unwrap();
        assert!(code.len() < "const answer = 40 + 2; console.log(answer);".len());
    }

    #[test]
    fn test_minify_js_invalid() {
        assert!(minify_js("const = ;;;").is_none());
    }

    #[test]
    fn test_minify_css() {
        let code = minify_css("body {\n  color: #ff0000;\n}\n").unwrap();
        assert!(code.contains("body"));
        assert!(!code.contains('\n'));
    }

    #[test]
    fn test_min_sibling() {
        assert_eq!(
            min_sibling(Path::new("dist/app.css")),
            PathBuf::from("dist/app.min.css")
        );
        assert_eq!(
            min_sibling(Path::new("dist/app.js")),
            PathBuf::from("dist/app.min.js")
        );
    }

    #[test]
    fn test_minify_outputs_skips_existing_min() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.css"), "body { color: red; }").unwrap();
        std::fs::write(dir.path().join("lib.min.css"), "a{}").unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>").unwrap();

        let mut config = SiteConfig::default();
        config.root = dir.path().to_path_buf();
        config.build.output = dir.path().to_path_buf();

        let count = minify_outputs(&config, "css").unwrap();
        assert_eq!(count, 1);
        assert!(dir.path().join("app.min.css").exists());
        // The existing .min file does not get a .min.min sibling
        assert!(!dir.path().join("lib.min.min.css").exists());
    }

    #[test]
    fn test_minify_outputs_tolerates_broken_source() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.js"), "const = broken ;;;").unwrap();

        let mut config = SiteConfig::default();
        config.root = dir.path().to_path_buf();
        config.build.output = dir.path().to_path_buf();

        minify_outputs(&config, "js").unwrap();
        // Fallback: the .min sibling carries the original source
        assert_eq!(
            std::fs::read_to_string(dir.path().join("bad.min.js")).unwrap(),
            "const = broken ;;;"
        );
    }
}
