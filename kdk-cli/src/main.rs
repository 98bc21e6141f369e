//! Main entry point for the kdk CLI.
//!
//! This is the command-line interface for configuring a kdk installation.
//! It provides commands for working with `kdk.yml`:
//! - `config get`: Print the effective value of a setting
//! - `config set`: Change a setting and save the document
//! - `config list`: Dump the whole configuration
//! - `config report`: Print a redacted report of user changes
//! - `completions`: Generate shell completion scripts

use clap::Parser;
use kdk_cli::cli::{Cli, Command};
use kdk_cli::utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let logger = kdk::init_logger(cli.verbose, cli.quiet);
    logger.install();

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_path: cli.config,
        logger,
    };

    // Execute the command
    let result = match cli.command {
        Command::Config(cmd) => cmd.execute(&global),
        Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            global.logger.error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    }
}
