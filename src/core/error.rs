//! Error handling for pyvm
//!
//! The error system is designed around two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! [`PyvmError`] enumerates every failure mode of a check-and-update run.
//! [`ErrorContext`] wraps an error with an optional suggestion and details
//! for terminal display, and [`user_friendly_error`] converts any
//! [`anyhow::Error`] reaching the CLI boundary into that form.
//!
//! # Propagation policy
//!
//! Transient network faults are retried inside the resolver and never
//! surface individually. All other faults propagate to the orchestrator
//! boundary as a typed value; the presentation layer's sole responsibility
//! is to display the diagnostic.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for pyvm operations.
///
/// Each variant represents a specific failure mode with enough context
/// for the CLI to produce a useful diagnostic. Variants map onto the
/// design taxonomy: detection errors are fatal for the current run,
/// resolution errors end the check phase, privilege errors are raised
/// before any destructive step, and installation errors carry the
/// captured output of the failed external step.
#[derive(Error, Debug)]
pub enum PyvmError {
    /// No Python interpreter could be located on PATH.
    #[error("No Python interpreter found on PATH (tried python3, python)")]
    InterpreterNotFound,

    /// The interpreter was found but its version could not be read.
    ///
    /// This should be unreachable in practice; callers treat it as fatal
    /// for the current check.
    #[error("Could not determine installed Python version: {reason}")]
    DetectionFailed {
        /// Why the version query or parse failed
        reason: String,
    },

    /// A version string failed strict `major.minor.patch` validation.
    #[error("Invalid version string '{version}' (expected major.minor.patch, e.g. 3.12.4)")]
    InvalidVersion {
        /// The rejected input
        version: String,
    },

    /// Remote version resolution exhausted its retry budget or returned
    /// unparseable data.
    #[error("Could not determine latest Python version after {attempts} attempt(s): {reason}")]
    ResolutionFailed {
        /// Total attempts made before giving up
        attempts: u32,
        /// The last underlying cause
        reason: String,
    },

    /// A network operation failed outside the resolver's retry loop.
    #[error("Network error during {operation}: {reason}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the failure
        reason: String,
    },

    /// An artifact download failed or returned a non-success status.
    #[error("Failed to download {url}: {reason}")]
    DownloadFailed {
        /// The artifact URL
        url: String,
        /// Reason for the failure
        reason: String,
    },

    /// An install step requires elevation the process does not hold.
    ///
    /// Raised before any download or process launch so a partially
    /// applied system-scope install can never occur.
    #[error("Administrative privileges are required to {operation}")]
    ElevationRequired {
        /// The operation that needs elevation
        operation: String,
    },

    /// A build prerequisite is missing on the host.
    ///
    /// Prerequisites are a precondition of the Linux source-build
    /// strategy and are never auto-installed.
    #[error("Required build tool '{tool}' was not found on PATH")]
    MissingPrerequisite {
        /// Name of the missing tool
        tool: String,
    },

    /// An external installer or build step failed.
    #[error("Installation step '{step}' failed: {detail}")]
    InstallationFailed {
        /// The step that failed (e.g. "configure", "make")
        step: String,
        /// Captured diagnostic output
        detail: String,
    },

    /// The host OS has no installation strategy.
    #[error("No installation strategy for this platform: {os}")]
    PlatformNotSupported {
        /// OS name reported by the platform probe
        os: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Semver parsing error
    #[error("Semver parsing error: {0}")]
    SemverError(#[from] semver::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// An error paired with user-facing context.
///
/// Wraps a [`PyvmError`] with an optional actionable suggestion (shown in
/// green) and additional details (shown in yellow). This is the form every
/// error takes when it reaches the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying pyvm error
    pub error: PyvmError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: PyvmError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining why the error occurred.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors.
    ///
    /// Error message is red and bold, details yellow, suggestion green.
    /// This is the primary way pyvm presents failures in the CLI.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`PyvmError`] variants and common IO failures and attaches
/// tailored suggestions; everything else is shown as-is.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(pyvm_error) = error.downcast_ref::<PyvmError>() {
        return contextualize(pyvm_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(PyvmError::Other {
                message: error.to_string(),
            })
            .with_suggestion(
                "Try running with elevated permissions (sudo/Administrator) or check file ownership",
            );
        }
    }

    ErrorContext::new(PyvmError::Other {
        message: format!("{error:#}"),
    })
}

fn contextualize(error: &PyvmError) -> ErrorContext {
    match error {
        PyvmError::InterpreterNotFound => ErrorContext::new(PyvmError::InterpreterNotFound)
            .with_suggestion("Install Python from https://www.python.org/downloads/ or ensure it is on PATH")
            .with_details("pyvm compares the latest release against the interpreter found on PATH"),

        PyvmError::ResolutionFailed {
            attempts,
            reason,
        } => ErrorContext::new(PyvmError::ResolutionFailed {
            attempts: *attempts,
            reason: reason.clone(),
        })
        .with_suggestion("Check your network connection and try again")
        .with_details("Transient network failures are already retried with backoff before this error is raised"),

        PyvmError::ElevationRequired {
            operation,
        } => ErrorContext::new(PyvmError::ElevationRequired {
            operation: operation.clone(),
        })
        .with_suggestion(if cfg!(windows) {
            "Re-run from an elevated (Administrator) prompt, or omit --system for a per-user install"
        } else {
            "Re-run with sudo, or omit --system to install under your home directory"
        }),

        PyvmError::MissingPrerequisite {
            tool,
        } => ErrorContext::new(PyvmError::MissingPrerequisite {
            tool: tool.clone(),
        })
        .with_suggestion("Install the build toolchain, e.g. 'apt install build-essential' or 'dnf groupinstall \"Development Tools\"'")
        .with_details("Building CPython from source requires a C compiler, make, and tar"),

        PyvmError::InstallationFailed {
            step,
            detail,
        } => ErrorContext::new(PyvmError::InstallationFailed {
            step: step.clone(),
            detail: detail.clone(),
        })
        .with_details("The pre-existing Python installation was left untouched"),

        PyvmError::InvalidVersion {
            version,
        } => ErrorContext::new(PyvmError::InvalidVersion {
            version: version.clone(),
        })
        .with_suggestion("Use a full numeric version such as 3.12.4"),

        PyvmError::PlatformNotSupported {
            os,
        } => ErrorContext::new(PyvmError::PlatformNotSupported {
            os: os.clone(),
        })
        .with_details("Installation strategies exist for Windows, Linux, and macOS only"),

        other => ErrorContext::new(PyvmError::Other {
            message: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_fields() {
        let err = PyvmError::InstallationFailed {
            step: "configure".to_string(),
            detail: "missing zlib headers".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configure"));
        assert!(msg.contains("missing zlib headers"));
    }

    #[test]
    fn context_builder_chains() {
        let ctx = ErrorContext::new(PyvmError::InterpreterNotFound)
            .with_suggestion("install python")
            .with_details("searched PATH");
        assert_eq!(ctx.suggestion.as_deref(), Some("install python"));
        assert_eq!(ctx.details.as_deref(), Some("searched PATH"));
    }

    #[test]
    fn user_friendly_error_recognizes_pyvm_errors() {
        let err = anyhow::Error::from(PyvmError::InterpreterNotFound);
        let ctx = user_friendly_error(err);
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn user_friendly_error_passes_through_generic_errors() {
        let ctx = user_friendly_error(anyhow::anyhow!("something odd"));
        assert!(ctx.error.to_string().contains("something odd"));
        assert!(ctx.suggestion.is_none());
    }

    #[test]
    fn display_format_stacks_sections() {
        let ctx = ErrorContext::new(PyvmError::Other {
            message: "boom".to_string(),
        })
        .with_details("why")
        .with_suggestion("fix");
        let rendered = format!("{ctx}");
        assert!(rendered.contains("boom"));
        assert!(rendered.contains("Details: why"));
        assert!(rendered.contains("Suggestion: fix"));
    }
}
