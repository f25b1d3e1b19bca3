//! Reference rewriting: rule set, URL canonicalization strategies, and the
//! document scanner that applies them.
//!
//! The pipeline runs three rewrite passes over compiled text:
//! flatten (post-compile), min-suffix (post-minify), categorize
//! (post-organize). Every strategy is idempotent, so re-running a pass is
//! always safe.

mod rules;
mod scan;
mod strategy;

pub use rules::{DocumentKind, RewriteRule, RuleSet};
pub use scan::{ScanError, scan};
pub use strategy::{RewriteContext, Strategy, rewrite};
