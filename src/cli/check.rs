//! Check for a newer Python release without installing anything.
//!
//! ```bash
//! # Human-readable comparison
//! pyvm check
//!
//! # JSON output for scripting
//! pyvm check --format json
//!
//! # Exit non-zero when an update exists (CI gates)
//! pyvm check --exit-code
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::GlobalConfig;
use crate::orchestrator::UpdateOrchestrator;

/// Command to compare the installed Python against the latest release.
#[derive(Args)]
pub struct CheckCommand {
    /// Output format (table or json).
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    format: String,

    /// Exit with code 1 when an update is available.
    #[arg(long)]
    exit_code: bool,
}

impl CheckCommand {
    /// Run the check and print the decision.
    ///
    /// # Errors
    ///
    /// Fails when no interpreter can be detected or resolution exhausts
    /// its attempts.
    pub async fn execute(self) -> Result<()> {
        let config = GlobalConfig::load().await?;
        let orchestrator = UpdateOrchestrator::new(config);

        let decision = orchestrator.check().await?;

        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&decision)?);
        } else {
            println!("Installed: Python {}", decision.local.as_str().bold());
            println!("Latest:    Python {}", decision.latest.as_str().bold());
            if decision.needs_update {
                println!(
                    "\n{} {} -> {}",
                    "Update available:".yellow().bold(),
                    decision.local,
                    decision.latest
                );
                println!("Run {} to install it.", "pyvm update".cyan());
            } else {
                println!("\n{}", "Python is up to date.".green());
            }
        }

        if self.exit_code && decision.needs_update {
            std::process::exit(1);
        }
        Ok(())
    }
}
