//! Show host platform and interpreter details.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::config::GlobalConfig;
use crate::interpreter;
use crate::platform;

/// Command to display the probed platform and interpreter state.
#[derive(Args)]
pub struct InfoCommand {
    /// Output format (table or json).
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    format: String,
}

impl InfoCommand {
    /// Probe the host and print what was found.
    ///
    /// A missing interpreter is reported, not treated as an error.
    ///
    /// # Errors
    ///
    /// Fails only when the config path cannot be determined.
    pub async fn execute(self) -> Result<()> {
        let identity = platform::identify_os();
        let elevated = platform::is_elevated();
        let interpreter = interpreter::detect().await.ok();
        let config_path = GlobalConfig::default_path()?;

        if self.format == "json" {
            let output = json!({
                "os": identity.family.as_str(),
                "arch": identity.arch,
                "elevated": elevated,
                "interpreter": interpreter.as_ref().map(|i| json!({
                    "path": &i.path,
                    "version": &i.version,
                })),
                "config_path": config_path,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("{}", "Host".bold());
        println!("  OS:       {}", identity.family);
        println!("  Arch:     {}", identity.arch);
        println!("  Elevated: {elevated}");
        println!();
        println!("{}", "Interpreter".bold());
        match &interpreter {
            Some(found) => {
                println!("  Path:     {}", found.path.display());
                println!("  Version:  {}", found.version);
            }
            None => println!("  {}", "No Python interpreter found on PATH".yellow()),
        }
        println!();
        println!("{}", "Configuration".bold());
        println!("  File:     {}", config_path.display());

        Ok(())
    }
}
