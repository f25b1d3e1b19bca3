//! Artifact category classification.

use std::path::Path;

/// Category bucket an output artifact is grouped into.
///
/// The extension table is fixed: classification is total and deterministic,
/// and anything outside the table is `Unclassified` (left in place by the
/// organize step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Styles,
    Scripts,
    Images,
    Fonts,
    Media,
    Unclassified,
}

impl Category {
    /// Classify a file extension (case-insensitive).
    ///
    /// `svg` is ambiguous between image and font use; it is resolved to the
    /// font bucket by convention, carried over from the original layout.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "css" => Self::Styles,
            "js" => Self::Scripts,
            "jpg" | "jpeg" | "png" | "gif" | "ico" => Self::Images,
            "eot" | "svg" | "ttf" | "woff" | "woff2" => Self::Fonts,
            "mp3" | "mp4" | "swf" => Self::Media,
            _ => Self::Unclassified,
        }
    }

    /// Classify a file path by its extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Unclassified, Self::from_extension)
    }

    /// Display name for this category.
    pub fn name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Fonts => "fonts",
            Self::Media => "media",
            Self::Unclassified => "unclassified",
        }
    }

    /// Whether the organize step relocates artifacts of this category.
    #[inline]
    pub fn is_classified(self) -> bool {
        !matches!(self, Self::Unclassified)
    }

    /// All relocatable categories, in output-directory order.
    pub fn classified() -> [Self; 5] {
        [
            Self::Styles,
            Self::Scripts,
            Self::Images,
            Self::Fonts,
            Self::Media,
        ]
    }
}
