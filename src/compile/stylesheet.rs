//! Stylesheet compilation via the external `sass` executable.
//!
//! The compiler is an opaque collaborator: input file in, compiled CSS (and
//! optionally a source map) out, flat in the output root. Partials (names
//! starting with `_`) are imported by other sheets and never compiled on
//! their own.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::utils::exec::{Cmd, SASS_FILTER};
use crate::utils::fs::list_files_with_ext;

/// Compile every stylesheet under `src/styles` into the output root.
///
/// Returns the number of sheets compiled.
pub fn compile_styles(config: &SiteConfig) -> Result<usize> {
    let sheets: Vec<PathBuf> = list_files_with_ext(&config.build.styles_dir(), &["scss", "sass"])
        .into_iter()
        .filter(|p| !is_partial(p))
        .collect();

    if sheets.is_empty() {
        return Ok(0);
    }

    let sass = find_sass()?;
    std::fs::create_dir_all(config.output_dir())
        .with_context(|| format!("failed to create {}", config.output_dir().display()))?;

    for sheet in &sheets {
        compile_one(&sass, sheet, config)?;
    }
    Ok(sheets.len())
}

/// Compile a single sheet to `<output>/<stem>.css`.
fn compile_one(sass: &Path, sheet: &Path, config: &SiteConfig) -> Result<()> {
    let stem = sheet
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("invalid stylesheet name: {}", sheet.display()))?;
    let out = config.output_dir().join(format!("{stem}.css"));

    let map_flag = if config.build.source_map {
        "--source-map"
    } else {
        "--no-source-map"
    };

    Cmd::new(sass)
        .arg(map_flag)
        .arg(sheet)
        .arg(&out)
        .cwd(config.get_root())
        .filter(&SASS_FILTER)
        .run()
        .with_context(|| format!("sass failed for {}", sheet.display()))?;
    Ok(())
}

/// Locate the sass executable on PATH.
fn find_sass() -> Result<PathBuf> {
    which::which("sass").context("`sass` executable not found on PATH (install dart-sass)")
}

/// Sass partials are imported, never compiled standalone.
fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}
