//! Command to change a setting and save the document.

use crate::error::CliError;
use crate::utils::{format_value, load_config, parse_cli_value, GlobalOptions};
use clap::Args;
use serde_yaml::Value;

/// Change a setting and save kdk.yml.
///
/// The value is read as YAML, so `true`, `3443` and `{FOO: bar}` are
/// typed; the setting then coerces it to its own kind.
#[derive(Args)]
pub struct ConfigSetCommand {
    /// Dotted path of the setting
    #[arg(value_name = "SLUG")]
    pub slug: String,

    /// New value
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,
}

impl ConfigSetCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let slug = self.slug.trim();
        if slug.is_empty() {
            return Err(CliError::InvalidArguments(
                "a setting to change is required".to_string(),
            ));
        }

        let (document, mut config) = load_config(global)?;

        // `None` when the stored value is invalid; setting it is the fix.
        let old = match config.dig(slug) {
            Ok(value) => Some(value),
            // A new key inside a map setting has no previous value.
            Err(e) if e.is_undefined() => Some(Value::Null),
            Err(e) if e.is_validation() => {
                global.logger.warn(&format!("Current value is unreadable: {e}"));
                None
            }
            Err(e) => return Err(e.into()),
        };
        let was_set = config.user_defined(slug)?;
        let new = config.bury(slug, parse_cli_value(&self.value))?;

        if was_set && old.as_ref() == Some(&new) {
            global.logger.warn(&format!(
                "'{slug}' is already set to '{}'",
                format_value(&new)?
            ));
            return Ok(());
        }

        document.save(&config)?;
        global
            .logger
            .info(&format!("Saved {}", document.path().display()));

        if !global.quiet {
            let previous = match &old {
                Some(value) => format!("'{}'", format_value(value)?),
                None => "unreadable".to_string(),
            };
            println!(
                "'{slug}' is now set to '{}' (previously {previous}).",
                format_value(&new)?
            );
        }
        Ok(())
    }
}
