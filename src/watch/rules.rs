//! Watch rules: glob pattern → ordered task list.
//!
//! Rules need not be disjoint. When a changed path matches several rules the
//! dispatcher runs the union of their task lists, deduplicated, preserving
//! first-seen order.

use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};

use crate::config::SiteConfig;

/// Built-in rules mapping a changed file's shape to its minimal rebuild.
const DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("**/*.{scss,sass}", &["sass", "rewrite-css"]),
    ("**/*.{js,mjs}", &["babel"]),
    ("**/*.{html,htm}", &["html", "rewrite-html"]),
    (
        "**/*.{png,jpg,jpeg,gif,ico,svg,eot,ttf,woff,woff2,mp3,mp4,swf}",
        &["media"],
    ),
];

/// A single watch rule.
pub struct WatchRule {
    matcher: GlobMatcher,
    tasks: Vec<String>,
}

/// All active rules for a watch session, built-ins first.
pub struct WatchRuleSet {
    rules: Vec<WatchRule>,
}

impl WatchRuleSet {
    /// Built-in rules plus the configured extras, in declaration order.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let mut rules = Vec::with_capacity(DEFAULT_RULES.len() + config.watch.rules.len());

        for (pattern, tasks) in DEFAULT_RULES {
            rules.push(WatchRule {
                matcher: Glob::new(pattern)?.compile_matcher(),
                tasks: tasks.iter().map(|t| t.to_string()).collect(),
            });
        }

        for entry in &config.watch.rules {
            let glob = Glob::new(&entry.pattern)
                .with_context(|| format!("invalid watch pattern '{}'", entry.pattern))?;
            rules.push(WatchRule {
                matcher: glob.compile_matcher(),
                tasks: entry.tasks.clone(),
            });
        }

        Ok(Self { rules })
    }

    /// Union task list for a single changed path, first-seen order.
    pub fn tasks_for(&self, path: &Path) -> Vec<String> {
        let mut tasks = Vec::new();
        for rule in &self.rules {
            if rule.matcher.is_match(path) {
                for task in &rule.tasks {
                    if !tasks.contains(task) {
                        tasks.push(task.clone());
                    }
                }
            }
        }
        tasks
    }

    /// Union task list across all changed paths, first-seen order.
    pub fn tasks_for_all<'a, I>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut tasks = Vec::new();
        for path in paths {
            for task in self.tasks_for(path) {
                if !tasks.contains(&task) {
                    tasks.push(task);
                }
            }
        }
        tasks
    }
}
