//! Artifact reorganization: move classified output files into per-category
//! subdirectories.
//!
//! Planning is pure (`plan_moves`); `organize` applies the plan with
//! tolerant-move semantics: a source that vanished between planning and
//! application is skipped, never an error. Applying the same plan twice
//! performs zero moves the second time.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::core::Category;
use crate::debug;
use crate::utils::fs::list_top_level;
use crate::utils::path::{extension, is_min_stem};

/// A file in the output tree with its classification.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// Current path in the output tree.
    pub path: PathBuf,
    /// Category bucket (pure function of the extension).
    pub category: Category,
    /// Whether the file carries the `.min` marker.
    pub is_minified: bool,
}

impl OutputArtifact {
    /// Classify a single output file.
    pub fn from_path(path: PathBuf) -> Self {
        let category = Category::from_extension(&extension(&path));
        let is_minified = is_min_stem(&path);
        Self {
            path,
            category,
            is_minified,
        }
    }
}

/// A planned relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Collect artifacts sitting flat at the output root.
///
/// Files already inside the asset directory are at their final location and
/// never collected, which is what makes a second organize run find nothing.
pub fn collect_artifacts(config: &SiteConfig) -> Vec<OutputArtifact> {
    list_top_level(config.output_dir())
        .into_iter()
        .map(OutputArtifact::from_path)
        .collect()
}

/// Plan the moves for a set of artifacts. Pure: no filesystem access.
///
/// Unclassified artifacts stay where they are. The destination is a pure
/// function of (category, configured layout, basename) - repeated builds
/// produce byte-identical paths.
pub fn plan_moves(artifacts: &[OutputArtifact], config: &SiteConfig) -> Vec<Move> {
    let assets = &config.build.assets;
    let output = config.output_dir();

    artifacts
        .iter()
        .filter_map(|artifact| {
            let subdir = assets.subdir(artifact.category)?;
            let name = artifact.path.file_name()?;
            Some(Move {
                from: artifact.path.clone(),
                to: output.join(&assets.dir).join(subdir).join(name),
            })
        })
        .collect()
}

/// Apply a move plan. Returns the moves actually performed.
///
/// Missing sources are skipped without error - not every build configuration
/// produces every category.
pub fn apply_moves(moves: &[Move]) -> Result<Vec<Move>> {
    let mut performed = Vec::new();

    for mv in moves {
        if !mv.from.exists() {
            debug!("organize"; "skip missing: {}", mv.from.display());
            continue;
        }
        if let Some(parent) = mv.to.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::rename(&mv.from, &mv.to).with_context(|| {
            format!("failed to move {} -> {}", mv.from.display(), mv.to.display())
        })?;
        performed.push(mv.clone());
    }

    Ok(performed)
}

/// Collect, plan and apply in one step. Returns the moves performed.
pub fn organize(config: &SiteConfig) -> Result<Vec<Move>> {
    let artifacts = collect_artifacts(config);
    let moves = plan_moves(&artifacts, config);
    apply_moves(&moves)
}

/// Directory the organized stylesheets live in (`<out>/<asset_dir>/<styles>`).
pub fn styles_dir(config: &SiteConfig) -> PathBuf {
    let assets = &config.build.assets;
    config.output_dir().join(&assets.dir).join(&assets.styles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.root = root.to_path_buf();
        config.build.output = root.join("dist");
        config
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_artifact_classification() {
        let artifact = OutputArtifact::from_path(PathBuf::from("dist/app.min.js"));
        assert_eq!(artifact.category, Category::Scripts);
        assert!(artifact.is_minified);

        let artifact = OutputArtifact::from_path(PathBuf::from("dist/index.html"));
        assert_eq!(artifact.category, Category::Unclassified);
        assert!(!artifact.is_minified);
    }

    #[test]
    fn test_plan_moves_skips_unclassified() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());

        let artifacts = vec![
            OutputArtifact::from_path(config.output_dir().join("main.css")),
            OutputArtifact::from_path(config.output_dir().join("index.html")),
            OutputArtifact::from_path(config.output_dir().join("main.css.map")),
        ];
        let moves = plan_moves(&artifacts, &config);

        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, config.output_dir().join("asset/styles/main.css"));
    }

    #[test]
    fn test_plan_moves_deterministic() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let artifacts = vec![OutputArtifact::from_path(
            config.output_dir().join("star.svg"),
        )];

        let a = plan_moves(&artifacts, &config);
        let b = plan_moves(&artifacts, &config);
        assert_eq!(a, b);
        assert_eq!(a[0].to, config.output_dir().join("asset/fonts/star.svg"));
    }

    #[test]
    fn test_organize_moves_classified() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());

        touch(&config.output_dir().join("main.css"));
        touch(&config.output_dir().join("app.min.js"));
        touch(&config.output_dir().join("photo.png"));
        touch(&config.output_dir().join("index.html"));

        let performed = organize(&config).unwrap();
        assert_eq!(performed.len(), 3);

        assert!(config.output_dir().join("asset/styles/main.css").exists());
        assert!(config.output_dir().join("asset/scripts/app.min.js").exists());
        assert!(config.output_dir().join("asset/images/photo.png").exists());
        // Unclassified stays in place
        assert!(config.output_dir().join("index.html").exists());
        assert!(!config.output_dir().join("main.css").exists());
    }

    #[test]
    fn test_organize_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());

        touch(&config.output_dir().join("main.css"));
        touch(&config.output_dir().join("star.svg"));

        let first = organize(&config).unwrap();
        assert_eq!(first.len(), 2);

        // Second invocation finds nothing left at the old locations
        let second = organize(&config).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_apply_moves_skips_missing_source() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(config.output_dir()).unwrap();

        let moves = vec![Move {
            from: config.output_dir().join("ghost.css"),
            to: config.output_dir().join("asset/styles/ghost.css"),
        }];
        let performed = apply_moves(&moves).unwrap();
        assert!(performed.is_empty());
    }

    #[test]
    fn test_styles_dir() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        assert_eq!(
            styles_dir(&config),
            config.output_dir().join("asset/styles")
        );
    }
}
