//! Install the latest (or a chosen) Python version.
//!
//! ```bash
//! # Check and install the latest release
//! pyvm update
//!
//! # Install a specific version instead of the latest
//! pyvm update --target 3.12.4
//!
//! # System-wide scope (requires elevation)
//! pyvm update --system
//! ```

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use tokio::sync::mpsc;

use crate::config::GlobalConfig;
use crate::interpreter;
use crate::orchestrator::{RunPhase, UpdateEvent, UpdateOrchestrator};
use crate::version::{self, VersionString};

/// Command to install a newer Python version side by side.
#[derive(Args)]
pub struct UpdateCommand {
    /// Install this exact version instead of the latest release.
    #[arg(long, value_name = "VERSION")]
    target: Option<String>,

    /// Install for all users into the system scope.
    ///
    /// Requires an elevated process on every platform.
    #[arg(long)]
    system: bool,
}

impl UpdateCommand {
    /// Run a full update: check, decide, install.
    ///
    /// # Errors
    ///
    /// Fails on detection, resolution, or installation errors, and when
    /// the installer itself reports failure.
    pub async fn execute(self) -> Result<()> {
        let target = self
            .target
            .as_deref()
            .map(VersionString::parse)
            .transpose()?;

        let mut config = GlobalConfig::load().await?;
        if self.system {
            config.install.system_wide = true;
        }
        let orchestrator = UpdateOrchestrator::new(config);

        if let Some(target) = target {
            return Self::install_target(&orchestrator, &target).await;
        }

        let (tx, mut rx) = mpsc::channel(16);
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                print_event(&event);
            }
        });

        let result = orchestrator.run(true, &tx).await;
        drop(tx);
        let _ = printer.await;

        match result? {
            RunPhase::Failed => bail!("installation did not complete; the existing Python is untouched"),
            _ => Ok(()),
        }
    }

    /// Install a pinned version, bypassing remote resolution.
    async fn install_target(
        orchestrator: &UpdateOrchestrator,
        target: &VersionString,
    ) -> Result<()> {
        let local = interpreter::detect_local_version().await?;
        let decision = version::decide(&local, target);

        if !decision.needs_update {
            println!(
                "{} Python {local} already satisfies {target}",
                "Up to date:".green().bold()
            );
            return Ok(());
        }

        println!("Installing Python {} (currently {local})", target.as_str().bold());
        let outcome = orchestrator.install(&decision).await?;
        if outcome.succeeded {
            println!("{} {}", "Success:".green().bold(), outcome.message);
            Ok(())
        } else {
            bail!("{}", outcome.message)
        }
    }
}

fn print_event(event: &UpdateEvent) {
    match event {
        UpdateEvent::CheckStarted => {
            println!("Checking for Python updates...");
        }
        UpdateEvent::CheckCompleted(decision) => {
            if decision.needs_update {
                println!(
                    "{} {} -> {}",
                    "Update available:".yellow().bold(),
                    decision.local,
                    decision.latest
                );
            } else {
                println!(
                    "{} Python {} is the latest release",
                    "Up to date:".green().bold(),
                    decision.local
                );
            }
        }
        UpdateEvent::CheckFailed(reason) => {
            eprintln!("{} {reason}", "Check failed:".red().bold());
        }
        UpdateEvent::InstallStarted(version) => {
            println!("Installing Python {}...", version.as_str().bold());
        }
        UpdateEvent::InstallCompleted(outcome) => {
            if outcome.succeeded {
                println!("{} {}", "Success:".green().bold(), outcome.message);
            } else {
                eprintln!("{} {}", "Failed:".red().bold(), outcome.message);
            }
        }
        UpdateEvent::InstallFailed(reason) => {
            eprintln!("{} {reason}", "Failed:".red().bold());
        }
    }
}
