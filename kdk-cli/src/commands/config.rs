//! The `config` command group.

use crate::commands::{
    ConfigGetCommand, ConfigListCommand, ConfigReportCommand, ConfigSetCommand,
};
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, Subcommand};

/// Read and change settings in kdk.yml.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Subcommands of `kdk config`.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective value of a setting
    Get(ConfigGetCommand),

    /// Change a setting and save kdk.yml
    Set(ConfigSetCommand),

    /// Print the whole configuration
    List(ConfigListCommand),

    /// Print a redacted report of customized settings
    Report(ConfigReportCommand),
}

impl ConfigCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        match self.action {
            ConfigAction::Get(cmd) => cmd.execute(global),
            ConfigAction::Set(cmd) => cmd.execute(global),
            ConfigAction::List(cmd) => cmd.execute(global),
            ConfigAction::Report(cmd) => cmd.execute(global),
        }
    }
}
