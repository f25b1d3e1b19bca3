//! Built-in task registry: primitive actions and composite macros.

use anyhow::{Context, Result};

use crate::compile::{markup, minify, script, stylesheet};
use crate::config::SiteConfig;
use crate::log;
use crate::organize;
use crate::pipeline;
use crate::rewrite::Strategy;
use crate::utils::fs::{clean_dir, flatten_copy, list_files};

/// A primitive task: a name and its side-effecting action.
pub struct Primitive {
    pub name: &'static str,
    pub run: fn(&SiteConfig) -> Result<()>,
}

/// Primitive task table, in pipeline order.
const PRIMITIVES: &[Primitive] = &[
    Primitive { name: "clean", run: clean },
    Primitive { name: "vendor", run: vendor },
    Primitive { name: "html", run: html },
    Primitive { name: "sass", run: sass },
    Primitive { name: "babel", run: babel },
    Primitive { name: "media", run: media },
    Primitive { name: "rewrite-html", run: rewrite_html },
    Primitive { name: "rewrite-css", run: rewrite_css },
    Primitive { name: "minify-css", run: minify_css },
    Primitive { name: "minify-js", run: minify_js },
    Primitive { name: "rewrite-min", run: rewrite_min },
    Primitive { name: "move-assets", run: move_assets },
    Primitive { name: "rewrite-organized", run: rewrite_organized },
    Primitive { name: "serve", run: serve },
    Primitive { name: "watch-run", run: watch_run },
];

/// Composite macro table. Expansion is pure textual substitution; names may
/// reference primitives or earlier composites.
const COMPOSITES: &[(&str, &[&str])] = &[
    (
        "compile",
        &[
            "vendor",
            "html",
            "sass",
            "babel",
            "media",
            "rewrite-html",
            "rewrite-css",
        ],
    ),
    ("min", &["minify-css", "minify-js", "rewrite-min"]),
    ("organize", &["move-assets", "rewrite-organized"]),
    ("build", &["clean", "compile", "min", "organize"]),
    ("test", &["clean", "babel"]),
    ("start", &["compile", "serve", "watch-run"]),
    ("default", &["start"]),
    ("watch", &["watch-run"]),
];

/// Look up a primitive by name.
pub(super) fn primitive(name: &str) -> Option<&'static Primitive> {
    PRIMITIVES.iter().find(|p| p.name == name)
}

/// Look up a composite by name.
pub(super) fn composite(name: &str) -> Option<(&'static str, &'static [&'static str])> {
    COMPOSITES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(n, deps)| (*n, *deps))
}

/// All known task names, composites first (for CLI error messages).
pub fn task_names() -> Vec<&'static str> {
    COMPOSITES
        .iter()
        .map(|(n, _)| *n)
        .chain(PRIMITIVES.iter().map(|p| p.name))
        .collect()
}

// ============================================================================
// Primitive Actions
// ============================================================================

fn clean(config: &SiteConfig) -> Result<()> {
    clean_dir(config.output_dir())?;
    log!("clean"; "{}", config.output_dir().display());
    Ok(())
}

/// Copy configured vendor files flat into the output root.
fn vendor(config: &SiteConfig) -> Result<()> {
    if config.build.vendor.is_empty() {
        return Ok(());
    }

    let output = config.output_dir();
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    for entry in &config.build.vendor {
        let source = entry.source();
        let dest = output.join(entry.output_name());
        std::fs::copy(source, &dest).with_context(|| {
            format!(
                "failed to copy vendor file {} -> {}",
                source.display(),
                dest.display()
            )
        })?;
    }
    log!("vendor"; "{} file(s)", config.build.vendor.len());
    Ok(())
}

fn html(config: &SiteConfig) -> Result<()> {
    let count = markup::compile_pages(config)?;
    log!("html"; "{count} page(s)");
    Ok(())
}

fn sass(config: &SiteConfig) -> Result<()> {
    let count = stylesheet::compile_styles(config)?;
    log!("sass"; "{count} sheet(s)");
    Ok(())
}

fn babel(config: &SiteConfig) -> Result<()> {
    let count = script::compile_scripts(config)?;
    log!("babel"; "{count} script(s)");
    Ok(())
}

/// Flatten-copy media files into the output root.
fn media(config: &SiteConfig) -> Result<()> {
    let files = list_files(&config.build.media_dir());
    for file in &files {
        flatten_copy(file, config.output_dir())?;
    }
    if !files.is_empty() {
        log!("media"; "{} file(s)", files.len());
    }
    Ok(())
}

/// Pass 1 (markup): flatten references to bare basenames.
fn rewrite_html(config: &SiteConfig) -> Result<()> {
    let report = pipeline::rewrite_markup(config, Strategy::Flatten)?;
    report.report("rewrite-html");
    Ok(())
}

/// Pass 1 (stylesheets): flatten references to bare basenames.
fn rewrite_css(config: &SiteConfig) -> Result<()> {
    let report = pipeline::rewrite_styles(config, Strategy::Flatten, config.output_dir())?;
    report.report("rewrite-css");
    Ok(())
}

fn minify_css(config: &SiteConfig) -> Result<()> {
    let count = minify::minify_outputs(config, "css")?;
    log!("min"; "{count} css file(s)");
    Ok(())
}

fn minify_js(config: &SiteConfig) -> Result<()> {
    let count = minify::minify_outputs(config, "js")?;
    log!("min"; "{count} js file(s)");
    Ok(())
}

/// Pass 2: point css/js references at their `.min` siblings.
fn rewrite_min(config: &SiteConfig) -> Result<()> {
    let markup = pipeline::rewrite_markup(config, Strategy::MinSuffix)?;
    markup.report("rewrite-min");
    let styles = pipeline::rewrite_styles(config, Strategy::MinSuffix, config.output_dir())?;
    styles.report("rewrite-min");
    Ok(())
}

/// Relocate classified artifacts into their category subdirectories.
fn move_assets(config: &SiteConfig) -> Result<()> {
    let moves = organize::organize(config)?;
    log!("organize"; "{} artifact(s) moved", moves.len());
    Ok(())
}

/// Pass 3: prefix references with category subdirectories, relative to each
/// document's post-organize location.
fn rewrite_organized(config: &SiteConfig) -> Result<()> {
    let markup = pipeline::rewrite_markup(config, Strategy::Categorize)?;
    markup.report("rewrite-organized");
    let styles =
        pipeline::rewrite_styles(config, Strategy::Categorize, &organize::styles_dir(config))?;
    styles.report("rewrite-organized");
    Ok(())
}

/// Spawn the development server in the background.
fn serve(config: &SiteConfig) -> Result<()> {
    crate::serve::spawn(config.clone())
}

/// Run the watch dispatcher (blocks until externally stopped).
fn watch_run(config: &SiteConfig) -> Result<()> {
    crate::watch::run(config)
}
