//! OS installation strategies for side-by-side Python installs.
//!
//! One strategy exists per supported OS family, each encapsulating the
//! sequence of steps required to fetch and run that platform's installer
//! for a target version. The orchestrator selects a strategy exactly once
//! via [`strategy_for`] and is otherwise polymorphic over the
//! [`InstallStrategy`] trait; it never branches on OS identity at call
//! sites.
//!
//! Every strategy upholds the same invariant: the pre-existing
//! installation is never removed, demoted, or registered over. An attempt
//! ends in one of two states only: new version fully usable, or new
//! version absent/partial with the old one untouched. Elevation, where a
//! strategy requires it, is checked by the orchestrator before the
//! strategy performs any download or process launch.

mod download;
mod linux;
mod macos;
mod step;
mod windows;

pub use download::ArtifactDownloader;
pub use linux::LinuxInstaller;
pub use macos::MacosInstaller;
pub use windows::WindowsInstaller;

use crate::config::InstallConfig;
use crate::core::PyvmError;
use crate::platform::{OsFamily, OsIdentity};
use crate::version::VersionString;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// The result of one installation attempt.
///
/// Produced once per attempt and never retried automatically; the caller
/// decides what to report. A failed outcome always means the pre-existing
/// installation was preserved.
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    /// Whether the target version is now fully usable.
    pub succeeded: bool,
    /// The version the attempt targeted.
    pub installed_version: VersionString,
    /// Human-readable diagnostic (success summary or failure detail).
    pub message: String,
}

impl InstallOutcome {
    /// A successful install of `version`.
    #[must_use]
    pub fn success(version: &VersionString, message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            installed_version: version.clone(),
            message: message.into(),
        }
    }

    /// A failed install attempt; the existing installation is untouched.
    #[must_use]
    pub fn failure(version: &VersionString, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            installed_version: version.clone(),
            message: message.into(),
        }
    }

    /// The no-op outcome for an install requested while already up to date.
    #[must_use]
    pub fn already_current(version: &VersionString) -> Self {
        Self {
            succeeded: true,
            installed_version: version.clone(),
            message: format!("Python {version} is already the latest version"),
        }
    }
}

/// A platform-specific installation procedure.
///
/// Implementations must be side-effect free until `install` is called;
/// in particular, a strategy declaring `requires_elevation` must tolerate
/// never being invoked when elevation is absent.
#[async_trait]
pub trait InstallStrategy: Send + Sync + std::fmt::Debug {
    /// The OS family this strategy targets.
    fn os(&self) -> OsFamily;

    /// Whether this strategy needs elevated privileges for its scope.
    ///
    /// Checked by the orchestrator before any destructive or
    /// system-scope step begins.
    fn requires_elevation(&self) -> bool;

    /// Fetch and run the installer for `target`, verifying the result.
    ///
    /// Installer and build failures are reported as a failed
    /// [`InstallOutcome`] carrying captured diagnostics; errors are
    /// reserved for environmental faults (download failures, missing
    /// prerequisites, IO).
    async fn install(&self, target: &VersionString) -> Result<InstallOutcome>;
}

/// Select the installation strategy for the probed host identity.
///
/// # Errors
///
/// Returns [`PyvmError::PlatformNotSupported`] for hosts outside the
/// three supported families.
pub fn strategy_for(
    identity: &OsIdentity,
    config: &InstallConfig,
) -> Result<Box<dyn InstallStrategy>> {
    match identity.family {
        OsFamily::Windows => Ok(Box::new(WindowsInstaller::new(&identity.arch, config))),
        OsFamily::Linux => Ok(Box::new(LinuxInstaller::new(config))),
        OsFamily::MacOs => Ok(Box::new(MacosInstaller::new(config))),
        OsFamily::Unsupported => Err(PyvmError::PlatformNotSupported {
            os: identity.family.to_string(),
        }
        .into()),
    }
}
