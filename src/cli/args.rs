//! Command-line interface definitions.
//!
//! Tasks are orchestrator names, not subcommands: `sitefab build`,
//! `sitefab clean compile`, `sitefab watch`. Running with no task executes
//! `default`.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// sitefab static-site asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sitefab.toml, searched upward from cwd)
    #[arg(short = 'C', long, default_value = "sitefab.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override source map emission for the compilers
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub source_map: Option<bool>,

    /// Tasks to run in order (default: `default`)
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,
}

impl Cli {
    /// Task list to execute, falling back to `default`.
    pub fn task_list(&self) -> Vec<String> {
        if self.tasks.is_empty() {
            vec!["default".to_string()]
        } else {
            self.tasks.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tasks() {
        let cli = Cli::parse_from(["sitefab", "clean", "build"]);
        assert_eq!(cli.task_list(), vec!["clean", "build"]);
    }

    #[test]
    fn test_default_task() {
        let cli = Cli::parse_from(["sitefab"]);
        assert_eq!(cli.task_list(), vec!["default"]);
    }

    #[test]
    fn test_source_map_flag() {
        let cli = Cli::parse_from(["sitefab", "--source-map", "false", "build"]);
        assert_eq!(cli.source_map, Some(false));

        let cli = Cli::parse_from(["sitefab", "build"]);
        assert_eq!(cli.source_map, None);
    }

    #[test]
    fn test_config_flag() {
        let cli = Cli::parse_from(["sitefab", "-C", "other.toml", "build"]);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
