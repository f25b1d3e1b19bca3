//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! debounce_ms = 300
//! interrupt = true
//! rules = [{ pattern = "**/*.svg", tasks = ["media"] }]
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window for filesystem notifications, in milliseconds.
    pub debounce_ms: u64,

    /// Abandon an in-flight dispatch when a new matching event arrives.
    pub interrupt: bool,

    /// Extra watch rules, checked after the built-in rules.
    pub rules: Vec<WatchRuleEntry>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            interrupt: true,
            rules: vec![],
        }
    }
}

/// A user-declared watch rule: glob pattern → ordered task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRuleEntry {
    pub pattern: String,
    pub tasks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let watch = WatchConfig::default();
        assert_eq!(watch.debounce_ms, 300);
        assert!(watch.interrupt);
        assert!(watch.rules.is_empty());
    }

    #[test]
    fn test_parse_rules() {
        let watch: WatchConfig = toml::from_str(
            r#"rules = [{ pattern = "**/*.svg", tasks = ["media", "rewrite-html"] }]"#,
        )
        .unwrap();
        assert_eq!(watch.rules.len(), 1);
        assert_eq!(watch.rules[0].tasks, vec!["media", "rewrite-html"]);
    }
}
