//! sitefab - static-site asset build pipeline.

#![allow(dead_code)]

mod cli;
mod compile;
mod config;
mod core;
mod logger;
mod organize;
mod pipeline;
mod rewrite;
mod serve;
mod task;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::SiteConfig;
use task::TaskError;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;
    let tasks = cli.task_list();

    match task::run(&tasks, &config) {
        Ok(()) => Ok(()),
        Err(err @ TaskError::Unknown(_)) => {
            log!("error"; "{err}");
            log!("error"; "known tasks: {}", task::task_names().join(", "));
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
