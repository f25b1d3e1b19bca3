//! `[build.assets]` section configuration.
//!
//! Names the per-category subdirectories the organize step moves classified
//! artifacts into, all nested under `dir` at the output root.
//!
//! # Example
//!
//! ```toml
//! [build.assets]
//! dir = "asset"
//! styles = "styles"
//! fonts = "fonts"
//! ```

use serde::{Deserialize, Serialize};

use crate::core::Category;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory under the output root holding all category subdirectories.
    pub dir: String,

    pub styles: String,
    pub scripts: String,
    pub images: String,
    pub fonts: String,
    pub media: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: "asset".into(),
            styles: "styles".into(),
            scripts: "scripts".into(),
            images: "images".into(),
            fonts: "fonts".into(),
            media: "media".into(),
        }
    }
}

impl AssetsConfig {
    /// Subdirectory name for a classified category.
    ///
    /// Returns `None` for `Unclassified` - those artifacts are never moved.
    pub fn subdir(&self, category: Category) -> Option<&str> {
        match category {
            Category::Styles => Some(&self.styles),
            Category::Scripts => Some(&self.scripts),
            Category::Images => Some(&self.images),
            Category::Fonts => Some(&self.fonts),
            Category::Media => Some(&self.media),
            Category::Unclassified => None,
        }
    }

    /// All configured subdirectory names, in category order.
    pub fn subdirs(&self) -> [&str; 5] {
        [
            &self.styles,
            &self.scripts,
            &self.images,
            &self.fonts,
            &self.media,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let assets = AssetsConfig::default();
        assert_eq!(assets.dir, "asset");
        assert_eq!(assets.subdir(Category::Fonts), Some("fonts"));
        assert_eq!(assets.subdir(Category::Unclassified), None);
    }

    #[test]
    fn test_subdir_total_over_classified() {
        let assets = AssetsConfig::default();
        for category in Category::classified() {
            assert!(assets.subdir(category).is_some());
        }
    }
}
