//! pyvm CLI entry point
//!
//! Handles command-line argument parsing, error display, and command
//! execution.
//!
//! Supported commands:
//! - `check` - Compare the installed Python against the latest release
//! - `update` - Install the latest (or a chosen) version side by side
//! - `info` - Show host platform and interpreter details

use anyhow::Result;
use clap::Parser;
use pyvm::cli;
use pyvm::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
