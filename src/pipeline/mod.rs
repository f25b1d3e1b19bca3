//! Rewrite pass driver: applies a canonicalization strategy to every
//! document of a kind in a directory.
//!
//! A document that fails to tokenize is written back unchanged and reported
//! per-document; a scan failure never aborts the batch.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::log;
use crate::rewrite::{DocumentKind, RewriteContext, RuleSet, ScanError, Strategy, rewrite, scan};
use crate::utils::fs::list_top_level;

/// Outcome of one rewrite pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Documents rewritten (including unchanged ones that scanned cleanly).
    pub rewritten: usize,
    /// Documents that could not be tokenized, left unchanged.
    pub failures: Vec<(PathBuf, ScanError)>,
}

impl PassReport {
    /// Log per-document failures. The batch itself still succeeded.
    pub fn report(&self, pass: &str) {
        for (path, err) in &self.failures {
            log!("error"; "{pass}: {} left unchanged ({err})", path.display());
        }
    }
}

/// Rewrite all top-level markup documents in the output root.
pub fn rewrite_markup(config: &SiteConfig, strategy: Strategy) -> Result<PassReport> {
    let docs: Vec<PathBuf> = list_top_level(config.output_dir())
        .into_iter()
        .filter(|p| DocumentKind::from_path(p) == Some(DocumentKind::Markup))
        .collect();

    run_pass(&docs, DocumentKind::Markup, strategy, config)
}

/// Rewrite all stylesheet documents directly inside `dir`.
///
/// Passes 1 and 2 target the output root; pass 3 targets the organized
/// styles directory.
pub fn rewrite_styles(config: &SiteConfig, strategy: Strategy, dir: &Path) -> Result<PassReport> {
    let docs: Vec<PathBuf> = list_top_level(dir)
        .into_iter()
        .filter(|p| DocumentKind::from_path(p) == Some(DocumentKind::Stylesheet))
        .collect();

    run_pass(&docs, DocumentKind::Stylesheet, strategy, config)
}

/// Scan and rewrite one batch of same-kind documents.
fn run_pass(
    docs: &[PathBuf],
    kind: DocumentKind,
    strategy: Strategy,
    config: &SiteConfig,
) -> Result<PassReport> {
    let rules = RuleSet::from_config(&config.rewrite);
    let ctx = RewriteContext {
        strategy,
        kind,
        assets: &config.build.assets,
    };

    let mut report = PassReport::default();
    for doc in docs {
        let text =
            fs::read_to_string(doc).with_context(|| format!("failed to read {}", doc.display()))?;

        match scan(kind, &text, &rules, |url| rewrite(url, &ctx)) {
            Ok(rewritten) => {
                // Skip the write when the pass was a no-op
                if rewritten != text {
                    fs::write(doc, rewritten)
                        .with_context(|| format!("failed to write {}", doc.display()))?;
                }
                report.rewritten += 1;
            }
            Err(err) => report.failures.push((doc.clone(), err)),
        }
    }
    Ok(report)
}
