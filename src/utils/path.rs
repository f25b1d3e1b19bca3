//! Path helpers. Pure functions, no side effects.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Lowercased extension of a path, or empty string.
#[inline]
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// File name of a path as a string, or empty string.
#[inline]
pub fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Check whether a file stem carries the `.min` marker (`app.min.js`).
#[inline]
pub fn is_min_stem(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with(".min"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        assert!(normalize_path(path).is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        assert!(normalize_path(path).is_absolute());
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension(Path::new("a/b/photo.PNG")), "png");
        assert_eq!(extension(Path::new("a/b/app.min.js")), "js");
        assert_eq!(extension(Path::new("a/b/noext")), "");
    }

    #[test]
    fn test_is_min_stem() {
        assert!(is_min_stem(Path::new("app.min.js")));
        assert!(is_min_stem(Path::new("dist/style.min.css")));
        assert!(!is_min_stem(Path::new("app.js")));
        assert!(!is_min_stem(Path::new("minify.js")));
    }
}
