//! Pipeline configuration management for `sitefab.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/     # Configuration section definitions
//! │   ├── build    # [build] (+ [build.assets]) and vendor entries
//! │   ├── rewrite  # [rewrite]
//! │   ├── serve    # [serve]
//! │   └── watch    # [watch]
//! ├── error        # ConfigError
//! └── mod.rs       # SiteConfig (this file)
//! ```
//!
//! The configuration is an explicit immutable value: constructed once in
//! `main` and passed by reference into every component. No component mutates
//! it after `load` returns.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{
    AssetsConfig, BuildConfig, MarkupRuleEntry, RewriteConfig, ServeConfig, VendorEntry,
    WatchConfig, WatchRuleEntry,
};

use crate::{cli::Cli, log};
use anyhow::{Result, bail};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sitefab.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build settings (paths, source maps, vendor files, asset layout)
    pub build: BuildConfig,

    /// Reference-rewriting rule tuning
    pub rewrite: RewriteConfig,

    /// Development server settings
    pub serve: ServeConfig,

    /// Watch dispatcher settings
    pub watch: WatchConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            build: BuildConfig::default(),
            rewrite: RewriteConfig::default(),
            serve: ServeConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file; a project without one
    /// runs on defaults with cwd as the project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = path;
                config
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                let mut config = Self::default();
                config.root = std::env::current_dir().unwrap_or_default();
                config
            }
        };

        let root = config.root.clone();
        config.build.normalize(&root);
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {}, ignoring:", display_path);
            for field in &ignored {
                eprintln!("- {field}");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Apply CLI overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(source_map) = cli.source_map {
            self.build.source_map = source_map;
        }
    }

    /// Validate the loaded configuration.
    fn validate(&self) -> Result<()> {
        if self.build.assets.dir.is_empty() {
            bail!(ConfigError::Validation(
                "[build.assets] dir must not be empty".into()
            ));
        }

        let mut seen = FxHashSet::default();
        for subdir in self.build.assets.subdirs() {
            if subdir.is_empty() {
                bail!(ConfigError::Validation(
                    "[build.assets] subdirectory names must not be empty".into()
                ));
            }
            if !seen.insert(subdir) {
                bail!(ConfigError::Validation(format!(
                    "[build.assets] duplicate subdirectory name '{subdir}'"
                )));
            }
        }

        for (idx, rule) in self.watch.rules.iter().enumerate() {
            if rule.tasks.is_empty() {
                bail!(ConfigError::Validation(format!(
                    "[watch] rules[{idx}] has an empty task list"
                )));
            }
            if globset::Glob::new(&rule.pattern).is_err() {
                bail!(ConfigError::Validation(format!(
                    "[watch] rules[{idx}] has an invalid glob pattern '{}'",
                    rule.pattern
                )));
            }
        }

        for (idx, entry) in self.build.vendor.iter().enumerate() {
            if entry.output_name().is_empty() {
                bail!(ConfigError::Validation(format!(
                    "[build] vendor[{idx}] has no usable output file name"
                )));
            }
        }

        Ok(())
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Output tree root.
    pub fn output_dir(&self) -> &Path {
        &self.build.output
    }
}

/// Search upward from cwd for the given config file name.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    if name.is_absolute() {
        return name.exists().then(|| name.to_path_buf());
    }

    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SiteConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_str_sections() {
        let config = SiteConfig::from_str(
            r#"
            [build]
            source = "web"
            output = "public"
            source_map = false

            [build.assets]
            dir = "static"

            [serve]
            port = 3000

            [watch]
            debounce_ms = 150
            "#,
        )
        .unwrap();

        assert_eq!(config.build.source, PathBuf::from("web"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(!config.build.source_map);
        assert_eq!(config.build.assets.dir, "static");
        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.watch.debounce_ms, 150);
    }

    #[test]
    fn test_validate_duplicate_subdirs() {
        let mut config = SiteConfig::default();
        config.build.assets.fonts = "styles".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_asset_dir() {
        let mut config = SiteConfig::default();
        config.build.assets.dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_watch_rule() {
        let mut config = SiteConfig::default();
        config.watch.rules.push(WatchRuleEntry {
            pattern: "**/*.svg".into(),
            tasks: vec![],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_glob() {
        let mut config = SiteConfig::default();
        config.watch.rules.push(WatchRuleEntry {
            pattern: "a{b".into(),
            tasks: vec!["media".into()],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_vendor_parse() {
        let config = SiteConfig::from_str(
            r#"
            [build]
            vendor = [
                "lib/jquery.min.js",
                { file = "icons/fav.ico", as = "favicon.ico" },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(config.build.vendor.len(), 2);
        assert_eq!(config.build.vendor[0].output_name(), "jquery.min.js");
        assert_eq!(config.build.vendor[1].output_name(), "favicon.ico");
    }
}
