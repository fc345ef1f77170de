#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Flock
//!
//! Admin command line over the member directory and the upload queue.
//!
//! This library holds everything the `flock` binary does, so integration
//! tests and other front ends can drive the same code.
//!
//! ## Public Modules
//!
//! - [`cli`] - Argument definitions
//! - [`config`] - TOML configuration
//! - [`commands`] - Subcommand implementations
//! - [`member`] - Member records and column model
//! - [`source`] - Member data sources
//! - [`render`] - Text rendering of a table page
//! - [`export`] - CSV export sink
//! - [`files`] - Files on disk and the copy transport
//! - [`logging`] - Subscriber setup

pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod files;
pub mod logging;
pub mod member;
pub mod render;
pub mod source;

use cli::{Cli, Command};
use config::Config;

/// Runs a parsed command line, writing the report to stdout.
///
/// # Errors
///
/// Returns whatever error the subcommand reports.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(&cli)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Command::Members(args) => commands::members(args, &config, &mut out),
        Command::Stage(args) => commands::stage(args, &config, &mut out).await,
    }
}
