//! URL canonicalization strategies.
//!
//! `rewrite` is a pure function `(url, context) -> url`. Data URIs and
//! absolute remote URLs pass through untouched under every strategy, and
//! every strategy is idempotent: rewriting an already-canonical URL is a
//! no-op.

use crate::config::AssetsConfig;
use crate::core::Category;

use super::rules::DocumentKind;

/// Canonicalization strategy for one rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Reduce the reference to its basename. Used right after compilation,
    /// when all outputs sit flat in the output root.
    Flatten,
    /// Point `.css`/`.js` references at their `.min` siblings.
    MinSuffix,
    /// Prefix the reference with its category subdirectory, relative to the
    /// document's location in the organized tree.
    Categorize,
}

/// Context for one rewrite pass: the strategy, the kind of document being
/// scanned, and the configured category layout.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub strategy: Strategy,
    pub kind: DocumentKind,
    pub assets: &'a AssetsConfig,
}

/// Rewrite a single asset reference.
///
/// The query string and fragment are preserved verbatim; only the path
/// portion is canonicalized.
pub fn rewrite(url: &str, ctx: &RewriteContext) -> String {
    if is_passthrough(url) {
        return url.to_string();
    }

    let (path, suffix) = split_suffix(url);
    if path.is_empty() {
        return url.to_string();
    }

    // Common step: reduce to basename, remap style-source extensions to the
    // compiled sibling's extension (fixed table, not inferred from disk).
    let name = remap_extension(basename(path));

    let rewritten = match ctx.strategy {
        Strategy::Flatten => name,
        Strategy::MinSuffix => min_suffix(&name),
        Strategy::Categorize => categorize(&name, ctx),
    };

    format!("{rewritten}{suffix}")
}

/// Whether a URL is never rewritten: data URIs and absolute remote URLs.
fn is_passthrough(url: &str) -> bool {
    let bytes = url.as_bytes();
    let lower_starts = |prefix: &[u8]| {
        bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
    };
    url.is_empty()
        || lower_starts(b"data:")
        || lower_starts(b"http://")
        || lower_starts(b"https://")
        || url.starts_with("//")
}

/// Split `path?query#fragment` into the path and the untouched remainder.
fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(idx) => (&url[..idx], &url[idx..]),
        None => (url, ""),
    }
}

/// Final path segment of a reference.
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Remap style-source extensions to `.css` (the compiled sibling).
fn remap_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("scss") || ext.eq_ignore_ascii_case("sass") => {
            format!("{stem}.css")
        }
        _ => name.to_string(),
    }
}

/// Insert `.min` before the final extension of `.css`/`.js` names.
fn min_suffix(name: &str) -> String {
    let minifiable = (name.ends_with(".css") && !name.ends_with(".min.css"))
        || (name.ends_with(".js") && !name.ends_with(".min.js"));
    if !minifiable {
        return name.to_string();
    }

    // ends_with above guarantees a dot
    let (stem, ext) = name.rsplit_once('.').unwrap();
    format!("{stem}.min.{ext}")
}

/// Prefix a classified name with its category subdirectory.
///
/// Markup documents sit at the output root, so the prefix is
/// `<asset_dir>/<subdir>/`; stylesheet documents already live inside the
/// asset directory (one level down), so they use `../<subdir>/`.
fn categorize(name: &str, ctx: &RewriteContext) -> String {
    let category = match name.rsplit_once('.') {
        Some((_, ext)) => Category::from_extension(ext),
        None => Category::Unclassified,
    };

    let Some(subdir) = ctx.assets.subdir(category) else {
        return name.to_string();
    };

    match ctx.kind {
        DocumentKind::Markup => format!("{}/{}/{}", ctx.assets.dir, subdir, name),
        DocumentKind::Stylesheet => format!("../{subdir}/{name}"),
    }
}
