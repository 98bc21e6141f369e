//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{CompletionsCommand, ConfigCommand};
use clap::{Parser, Subcommand};
use kdk::config::CONFIG_ENV;
use std::path::PathBuf;

/// Command-line tool for configuring the kdk development environment.
#[derive(Parser)]
#[command(name = "kdk")]
#[command(version, about = "Configure the kdk development environment", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Use this configuration document instead of ./kdk.yml
    #[arg(long, value_name = "PATH", global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Read and change settings in kdk.yml
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
