//! Command to print the effective value of a setting.

use crate::error::CliError;
use crate::utils::{format_value, load_config, GlobalOptions};
use clap::Args;

/// Print the effective value of a setting.
#[derive(Args)]
pub struct ConfigGetCommand {
    /// Dotted path of the setting (e.g. `rails.port`, `services.0.name`)
    #[arg(value_name = "SLUG")]
    pub slug: String,
}

impl ConfigGetCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (_, config) = load_config(global)?;
        let value = config.dig(self.slug.as_str())?;
        println!("{}", format_value(&value)?);
        Ok(())
    }
}
