//! macOS installation via the official universal2 `.pkg`.

use crate::config::InstallConfig;
use crate::constants::PYTHON_FTP_BASE;
use crate::install::download::ArtifactDownloader;
use crate::install::step::{outcome_from_step, run_step};
use crate::install::{InstallOutcome, InstallStrategy};
use crate::platform::OsFamily;
use crate::version::VersionString;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Runs `installer -pkg` against the official macOS package.
///
/// The pkg payload lands under
/// `/Library/Frameworks/Python.framework/Versions/{major.minor}`, a
/// version-keyed directory that coexists with older versions by
/// construction. `installer` always writes into the system domain, so
/// this strategy requires elevation regardless of configured scope.
#[derive(Debug)]
pub struct MacosInstaller;

impl MacosInstaller {
    /// Create the installer. Scope configuration is accepted for
    /// interface symmetry but cannot narrow a pkg install.
    #[must_use]
    pub fn new(_config: &InstallConfig) -> Self {
        Self
    }

    /// The download URL of the universal2 package for `target`.
    fn artifact_url(target: &VersionString) -> String {
        format!("{PYTHON_FTP_BASE}/{target}/python-{target}-macos11.pkg")
    }
}

#[async_trait]
impl InstallStrategy for MacosInstaller {
    fn os(&self) -> OsFamily {
        OsFamily::MacOs
    }

    fn requires_elevation(&self) -> bool {
        true
    }

    async fn install(&self, target: &VersionString) -> Result<InstallOutcome> {
        let url = Self::artifact_url(target);
        let staging = tempfile::tempdir()?;

        info!("Downloading Python {target} package");
        let pkg = ArtifactDownloader::new()?.fetch(&url, staging.path()).await?;

        info!("Installing Python {target} package");
        let pkg_path = pkg.to_string_lossy().to_string();
        let result = run_step(
            "installer",
            "installer",
            &["-pkg", &pkg_path, "-target", "/"],
            None,
        )
        .await?;
        if !result.success {
            return Ok(outcome_from_step(target, "installer", &result));
        }

        // The pkg drops framework stubs; confirm the suffixed binary runs.
        let binary = format!(
            "/Library/Frameworks/Python.framework/Versions/{}/bin/python{}",
            target.major_minor(),
            target.major_minor()
        );
        let verify = run_step("verify", &binary, &["--version"], None).await?;
        let banner = format!("{}{}", verify.stdout, verify.stderr);
        if verify.success && banner.contains(target.as_str()) {
            Ok(InstallOutcome::success(
                target,
                format!("Python {target} installed to {binary}"),
            ))
        } else {
            Ok(InstallOutcome::failure(
                target,
                format!("installed binary at {binary} did not report {target}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_url_uses_macos11_package() {
        let target = VersionString::parse("3.12.4").unwrap();
        assert_eq!(
            MacosInstaller::artifact_url(&target),
            "https://www.python.org/ftp/python/3.12.4/python-3.12.4-macos11.pkg"
        );
    }

    #[test]
    fn always_requires_elevation() {
        let per_user = MacosInstaller::new(&InstallConfig::default());
        assert!(per_user.requires_elevation());
    }
}
