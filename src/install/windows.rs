//! Windows installation via the official `.exe` installer.

use crate::config::InstallConfig;
use crate::constants::PYTHON_FTP_BASE;
use crate::core::PyvmError;
use crate::install::download::ArtifactDownloader;
use crate::install::step::{outcome_from_step, run_step};
use crate::install::{InstallOutcome, InstallStrategy};
use crate::platform::OsFamily;
use crate::version::VersionString;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Runs the official Windows installer in passive mode.
///
/// Passive mode shows installer progress without prompting, so the run
/// is unattended but not invisible. `PrependPath=0` and
/// `AssociateFiles=0` keep the existing installation primary: the new
/// version is installed side by side without taking over PATH or file
/// associations.
#[derive(Debug)]
pub struct WindowsInstaller {
    arch: String,
    system_wide: bool,
}

impl WindowsInstaller {
    /// Create an installer for the probed `arch` under `config`'s scope.
    #[must_use]
    pub fn new(arch: &str, config: &InstallConfig) -> Self {
        Self {
            arch: arch.to_string(),
            system_wide: config.system_wide,
        }
    }

    /// The download URL of the installer executable for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`PyvmError::PlatformNotSupported`] for architectures
    /// python.org ships no Windows installer for.
    fn artifact_url(&self, target: &VersionString) -> Result<String> {
        let suffix = match self.arch.as_str() {
            "x86_64" | "amd64" => "amd64",
            "aarch64" | "arm64" => "arm64",
            other => {
                return Err(PyvmError::PlatformNotSupported {
                    os: format!("windows/{other}"),
                }
                .into());
            }
        };
        Ok(format!("{PYTHON_FTP_BASE}/{target}/python-{target}-{suffix}.exe"))
    }

    /// Installer arguments for the configured scope.
    fn installer_args(&self) -> Vec<String> {
        let all_users = if self.system_wide { "1" } else { "0" };
        vec![
            "/passive".to_string(),
            format!("InstallAllUsers={all_users}"),
            "PrependPath=0".to_string(),
            "AssociateFiles=0".to_string(),
        ]
    }
}

#[async_trait]
impl InstallStrategy for WindowsInstaller {
    fn os(&self) -> OsFamily {
        OsFamily::Windows
    }

    fn requires_elevation(&self) -> bool {
        self.system_wide
    }

    async fn install(&self, target: &VersionString) -> Result<InstallOutcome> {
        let url = self.artifact_url(target)?;
        let staging = tempfile::tempdir()?;

        info!("Downloading Python {target} installer");
        let installer = ArtifactDownloader::new()?.fetch(&url, staging.path()).await?;

        info!("Running installer for Python {target}");
        let args = self.installer_args();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let installer_path = installer.to_string_lossy().to_string();
        let result = run_step("installer", &installer_path, &arg_refs, None).await?;

        Ok(outcome_from_step(target, "installer", &result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> VersionString {
        VersionString::parse("3.12.4").unwrap()
    }

    #[test]
    fn artifact_url_maps_architectures() {
        let per_user = InstallConfig::default();
        let amd = WindowsInstaller::new("x86_64", &per_user);
        assert_eq!(
            amd.artifact_url(&target()).unwrap(),
            "https://www.python.org/ftp/python/3.12.4/python-3.12.4-amd64.exe"
        );

        let arm = WindowsInstaller::new("aarch64", &per_user);
        assert_eq!(
            arm.artifact_url(&target()).unwrap(),
            "https://www.python.org/ftp/python/3.12.4/python-3.12.4-arm64.exe"
        );
    }

    #[test]
    fn unknown_architecture_is_rejected() {
        let per_user = InstallConfig::default();
        let installer = WindowsInstaller::new("riscv64", &per_user);
        let err = installer.artifact_url(&target()).unwrap_err();
        let err = err.downcast::<PyvmError>().unwrap();
        assert!(matches!(err, PyvmError::PlatformNotSupported { .. }));
    }

    #[test]
    fn installer_args_follow_scope() {
        let per_user = WindowsInstaller::new("x86_64", &InstallConfig::default());
        assert_eq!(
            per_user.installer_args(),
            ["/passive", "InstallAllUsers=0", "PrependPath=0", "AssociateFiles=0"]
        );

        let system = WindowsInstaller::new(
            "x86_64",
            &InstallConfig {
                system_wide: true,
                ..Default::default()
            },
        );
        assert_eq!(system.installer_args()[1], "InstallAllUsers=1");
    }
}
