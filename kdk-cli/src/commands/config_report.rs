//! Command to print a redacted report of customized settings.

use crate::error::CliError;
use crate::utils::{load_config, GlobalOptions};
use clap::Args;
use kdk::config::ConfigReport;

/// Print a redacted report of customized settings, for bug reports.
///
/// Secrets are masked, and settings that cannot be read are listed
/// instead of stopping the report.
#[derive(Args)]
pub struct ConfigReportCommand {}

impl ConfigReportCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let (document, config) = load_config(global)?;
        let report = ConfigReport::build(&config);

        println!("# {}", document.path().display());
        let customized = serde_yaml::to_string(&report.customized).map_err(kdk::Error::from)?;
        println!("{}", customized.trim_end());

        for setting in &report.unreadable {
            println!("# cannot read setting {}: {}", setting.slug, setting.error);
        }
        if !report.unreadable.is_empty() {
            global.logger.warn(&format!(
                "{} setting(s) could not be read",
                report.unreadable.len()
            ));
        }
        Ok(())
    }
}
