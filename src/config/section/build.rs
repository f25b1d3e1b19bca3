//! `[build]` section configuration.
//!
//! Paths of the source/output trees and the vendor file list.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"
//! output = "dist"
//! source_map = true
//! vendor = [
//!     "node_modules/jquery/dist/jquery.min.js",
//!     { file = "third_party/shim.js", as = "es5-shim.min.js" },
//! ]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::AssetsConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source tree root (relative to project root until normalized).
    pub source: PathBuf,

    /// Output tree root.
    pub output: PathBuf,

    /// Subdirectory of `source` holding markup pages.
    pub pages: String,

    /// Subdirectory of `source` holding stylesheets.
    pub styles: String,

    /// Subdirectory of `source` holding scripts.
    pub scripts: String,

    /// Subdirectory of `source` holding media files.
    pub media: String,

    /// Emit source maps from the stylesheet compiler.
    pub source_map: bool,

    /// Vendor files copied flat into the output root.
    pub vendor: Vec<VendorEntry>,

    /// Category layout for the organize step.
    pub assets: AssetsConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src"),
            output: PathBuf::from("dist"),
            pages: "pages".into(),
            styles: "styles".into(),
            scripts: "scripts".into(),
            media: "media".into(),
            source_map: true,
            vendor: vec![],
            assets: AssetsConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Normalize `source`/`output` relative to the project root.
    pub fn normalize(&mut self, root: &Path) {
        if self.source.is_relative() {
            self.source = root.join(&self.source);
        }
        if self.output.is_relative() {
            self.output = root.join(&self.output);
        }
        for entry in &mut self.vendor {
            entry.normalize(root);
        }
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.source.join(&self.pages)
    }

    pub fn styles_dir(&self) -> PathBuf {
        self.source.join(&self.styles)
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.source.join(&self.scripts)
    }

    pub fn media_dir(&self) -> PathBuf {
        self.source.join(&self.media)
    }
}

// ============================================================================
// Vendor Entries
// ============================================================================

/// A vendor file copied flat into the output root.
///
/// Either a bare path or a `{ file, as }` pair renaming the output:
/// - `"node_modules/jquery/dist/jquery.min.js"` → `dist/jquery.min.js`
/// - `{ file = "icons/fav.ico", as = "favicon.ico" }` → `dist/favicon.ico`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VendorEntry {
    Simple(PathBuf),
    Full {
        file: PathBuf,
        #[serde(rename = "as")]
        output_as: Option<String>,
    },
}

impl VendorEntry {
    /// Source file path.
    pub fn source(&self) -> &Path {
        match self {
            Self::Simple(path) => path,
            Self::Full { file, .. } => file,
        }
    }

    /// File name the entry outputs as.
    pub fn output_name(&self) -> &str {
        match self {
            Self::Simple(path) => path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            Self::Full {
                file,
                output_as: Some(name),
            } if !name.is_empty() => name,
            Self::Full { file, .. } => file.file_name().and_then(|n| n.to_str()).unwrap_or(""),
        }
    }

    fn normalize(&mut self, root: &Path) {
        let path = match self {
            Self::Simple(path) => path,
            Self::Full { file, .. } => file,
        };
        if path.is_relative() {
            *path = root.join(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let build = BuildConfig::default();
        assert_eq!(build.source, PathBuf::from("src"));
        assert_eq!(build.output, PathBuf::from("dist"));
        assert!(build.source_map);
        assert!(build.vendor.is_empty());
    }

    #[test]
    fn test_subdir_accessors() {
        let mut build = BuildConfig::default();
        build.normalize(Path::new("/proj"));
        assert_eq!(build.pages_dir(), PathBuf::from("/proj/src/pages"));
        assert_eq!(build.styles_dir(), PathBuf::from("/proj/src/styles"));
        assert_eq!(build.scripts_dir(), PathBuf::from("/proj/src/scripts"));
        assert_eq!(build.media_dir(), PathBuf::from("/proj/src/media"));
    }

    #[test]
    fn test_vendor_entry_simple() {
        let entry: VendorEntry = toml::from_str::<toml::Value>(r#"v = "lib/jquery.min.js""#)
            .unwrap()
            .get("v")
            .cloned()
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(entry.output_name(), "jquery.min.js");
    }

    #[test]
    fn test_vendor_entry_renamed() {
        let entry = VendorEntry::Full {
            file: PathBuf::from("icons/fav.ico"),
            output_as: Some("favicon.ico".into()),
        };
        assert_eq!(entry.output_name(), "favicon.ico");
        assert_eq!(entry.source(), Path::new("icons/fav.ico"));
    }

    #[test]
    fn test_vendor_entry_rename_empty_falls_back() {
        let entry = VendorEntry::Full {
            file: PathBuf::from("icons/fav.ico"),
            output_as: Some(String::new()),
        };
        assert_eq!(entry.output_name(), "fav.ico");
    }

    #[test]
    fn test_vendor_normalize() {
        let mut entry = VendorEntry::Simple(PathBuf::from("lib/x.js"));
        entry.normalize(Path::new("/proj"));
        assert_eq!(entry.source(), Path::new("/proj/lib/x.js"));
    }
}
