//! Command-line interface for pyvm.
//!
//! Each command lives in its own module with its own argument structure
//! and execution logic:
//!
//! - `check` - Compare the installed Python against the latest release
//! - `update` - Install the latest (or a chosen) Python version
//! - `info` - Show host platform and interpreter details
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--no-progress` - Disable progress bars
//! - `--config` - Path to a custom config file
//!
//! # Example
//!
//! ```bash
//! # See whether an update exists
//! pyvm check
//!
//! # Install the latest release
//! pyvm update
//!
//! # Scripting-friendly output
//! pyvm --quiet check --format json
//! ```

mod check;
mod info;
mod update;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Runtime configuration for CLI execution.
///
/// Holds settings that are otherwise communicated through environment
/// variables, so tests and programmatic callers can control behavior
/// without mutating global state up front.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level for the `RUST_LOG` environment variable.
    ///
    /// When `None`, the existing `RUST_LOG` value is preserved.
    pub log_level: Option<String>,

    /// Whether to disable progress bars during downloads.
    ///
    /// When `true`, sets the `PYVM_NO_PROGRESS` environment variable.
    pub no_progress: bool,

    /// Custom path to the global configuration file.
    ///
    /// When specified, sets the `PYVM_CONFIG` environment variable to
    /// override the default location (`~/.pyvm/config.toml`).
    pub config_path: Option<String>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Called exactly once at the start of CLI execution, before any
    /// threads are spawned.
    pub fn apply_to_env(&self) {
        if let Some(ref level) = self.log_level {
            unsafe { std::env::set_var("RUST_LOG", level) };
        }

        if self.no_progress {
            unsafe { std::env::set_var(crate::constants::NO_PROGRESS_ENV_VAR, "1") };
        }

        if let Some(ref path) = self.config_path {
            unsafe { std::env::set_var(crate::constants::CONFIG_ENV_VAR, path) };
        }
    }
}

/// Main CLI application structure for pyvm.
///
/// Handles global flags and delegates to subcommands for specific
/// operations. All options marked `global = true` are available to every
/// subcommand.
#[derive(Parser)]
#[command(
    name = "pyvm",
    about = "Keep the system Python interpreter current",
    version,
    author,
    long_about = "pyvm checks the locally installed Python interpreter against the \
                  latest release published on python.org and installs newer versions \
                  side by side using each platform's official distribution channel."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Equivalent to setting `RUST_LOG=debug`. Mutually exclusive with
    /// `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom global configuration file.
    ///
    /// Overrides the default location (`~/.pyvm/config.toml`).
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Disable progress bars for automation.
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands for the pyvm CLI.
#[derive(Subcommand)]
enum Commands {
    /// Check whether a newer Python release is available.
    ///
    /// Detects the locally installed interpreter, resolves the latest
    /// release from python.org, and reports the comparison without
    /// changing anything.
    Check(check::CheckCommand),

    /// Install the latest (or a chosen) Python version.
    ///
    /// Runs a full check first, then installs side by side when a newer
    /// version exists. The pre-existing installation is never removed.
    Update(update::UpdateCommand),

    /// Show host platform and interpreter details.
    Info(info::InfoCommand),
}

impl Cli {
    /// Execute the CLI with configuration derived from the parsed flags.
    ///
    /// # Errors
    ///
    /// Propagates command failures for the entry point to render.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed CLI arguments.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None // no logging when quiet
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an injected configuration.
    ///
    /// # Errors
    ///
    /// Propagates errors from the dispatched subcommand.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply_to_env();
        init_logging();

        match self.command {
            Commands::Check(cmd) => cmd.execute().await,
            Commands::Update(cmd) => cmd.execute().await,
            Commands::Info(cmd) => cmd.execute().await,
        }
    }
}

/// Initialize the tracing subscriber from `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    if std::env::var("RUST_LOG").is_err() {
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
