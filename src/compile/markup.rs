//! Markup "compilation": flatten-copy pages into the output root.
//!
//! Pages need no transformation at this stage - reference canonicalization
//! happens in the rewrite pass that follows compilation.

use anyhow::Result;

use crate::config::SiteConfig;
use crate::utils::fs::{flatten_copy, list_files_with_ext};

/// Copy every page under `src/pages` flat into the output root.
///
/// Returns the number of pages written.
pub fn compile_pages(config: &SiteConfig) -> Result<usize> {
    let pages = list_files_with_ext(&config.build.pages_dir(), &["html", "htm"]);
    let output = config.output_dir();

    for page in &pages {
        flatten_copy(page, output)?;
    }
    Ok(pages.len())
}
