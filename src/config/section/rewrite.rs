//! `[rewrite]` section configuration.
//!
//! Tunes the default markup rule set: rules can be disabled by their
//! `tag[attr]` name, and extra tag+attribute pairs can be declared.
//!
//! # Example
//!
//! ```toml
//! [rewrite]
//! disabled = ["video[poster]"]
//! extra = [{ tag = "object", attr = "data" }]
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Default rules to disable, named as `tag[attr]`.
    pub disabled: Vec<String>,

    /// Extra markup rules beyond the defaults.
    pub extra: Vec<MarkupRuleEntry>,
}

/// A user-declared markup rule (tag + attribute pair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupRuleEntry {
    pub tag: String,
    pub attr: String,
}

impl RewriteConfig {
    /// Whether a default rule named `tag[attr]` is disabled.
    pub fn is_disabled(&self, tag: &str, attr: &str) -> bool {
        let name = format!("{tag}[{attr}]");
        self.disabled.iter().any(|d| d == &name)
    }
}
