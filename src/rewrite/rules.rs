//! Rewrite rule set: which positions in a document hold asset references.
//!
//! Markup rules are tag+attribute pairs; stylesheet documents are always
//! scanned for `url(...)` calls, so they carry no per-rule configuration.

use std::path::Path;

use crate::config::RewriteConfig;

/// Kind of document the scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// HTML pages - references sit in declared tag attributes.
    Markup,
    /// CSS - references sit in `url(...)` calls.
    Stylesheet,
}

impl DocumentKind {
    /// Detect document kind from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Self::Markup),
            "css" => Some(Self::Stylesheet),
            _ => None,
        }
    }

    /// Detect document kind from file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A single markup rule: rewrite `attr` on `<tag>` elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub tag: String,
    pub attr: String,
}

impl RewriteRule {
    fn new(tag: &str, attr: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attr: attr.to_ascii_lowercase(),
        }
    }
}

/// Default markup rule table: the attribute positions that hold asset
/// references in compiled pages.
const DEFAULT_MARKUP_RULES: &[(&str, &str)] = &[
    ("link", "href"),
    ("script", "src"),
    ("img", "src"),
    ("source", "src"),
    ("audio", "src"),
    ("video", "src"),
    ("video", "poster"),
];

/// Active rule set for a build, constructed once from configuration.
#[derive(Debug, Clone)]
pub struct RuleSet {
    markup: Vec<RewriteRule>,
}

impl RuleSet {
    /// Build the rule set: defaults minus disabled plus configured extras.
    pub fn from_config(config: &RewriteConfig) -> Self {
        let mut markup: Vec<RewriteRule> = DEFAULT_MARKUP_RULES
            .iter()
            .filter(|(tag, attr)| !config.is_disabled(tag, attr))
            .map(|(tag, attr)| RewriteRule::new(tag, attr))
            .collect();

        for extra in &config.extra {
            let rule = RewriteRule::new(&extra.tag, &extra.attr);
            if !markup.contains(&rule) {
                markup.push(rule);
            }
        }

        Self { markup }
    }

    /// Default rule set with nothing disabled.
    pub fn defaults() -> Self {
        Self::from_config(&RewriteConfig::default())
    }

    /// Whether `attr` on `<tag>` is a declared reference position.
    ///
    /// Tag and attribute comparison is case-insensitive, matching HTML.
    pub fn matches(&self, tag: &str, attr: &str) -> bool {
        self.markup
            .iter()
            .any(|r| r.tag.eq_ignore_ascii_case(tag) && r.attr.eq_ignore_ascii_case(attr))
    }

    /// Whether any rule exists for `<tag>` at all.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.markup.iter().any(|r| r.tag.eq_ignore_ascii_case(tag))
    }
}
