//! Command to print the whole configuration.

use crate::error::CliError;
use crate::utils::{load_config, GlobalOptions};
use clap::{Args, ValueEnum};

/// Output format for `config list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// YAML, as written to kdk.yml
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Print the whole configuration.
#[derive(Args)]
pub struct ConfigListCommand {
    /// Only show settings the user configured
    #[arg(long)]
    pub user_only: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: ListFormat,
}

impl ConfigListCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (_, config) = load_config(global)?;
        let dumped = config.dump(self.user_only)?;

        let output = match self.format {
            ListFormat::Yaml => serde_yaml::to_string(&dumped).map_err(kdk::Error::from)?,
            ListFormat::Json => serde_json::to_string_pretty(&dumped)
                .map_err(|e| CliError::SemanticFailure(format!("cannot encode as JSON: {e}")))?,
        };
        println!("{}", output.trim_end());
        Ok(())
    }
}
