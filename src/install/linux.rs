//! Linux installation by building CPython from source.
//!
//! No uniform binary distribution exists across distros, so the strategy
//! follows the canonical source procedure: download the release tarball,
//! `./configure --prefix`, `make -jN`, then `make altinstall`. The
//! `altinstall` target writes only version-suffixed binaries
//! (`python3.12`, not `python3`), which keeps the existing installation
//! primary.

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
use std::path::PathBuf;
use tracing::info;

/// Tools the source build cannot proceed without.
///
/// A C compiler is satisfied by either `cc` or `gcc`.
const REQUIRED_TOOLS: &[&str] = &["make", "tar"];

/// Builds and alt-installs CPython from the official source tarball.
#[derive(Debug)]
pub struct LinuxInstaller {
    system_wide: bool,
    prefix: Option<PathBuf>,
    build_jobs: Option<usize>,
}

impl LinuxInstaller {
    /// Create an installer scoped and tuned by `config`.
    #[must_use]
    pub fn new(config: &InstallConfig) -> Self {
        Self {
            system_wide: config.system_wide,
            prefix: config.prefix.clone(),
            build_jobs: config.build_jobs,
        }
    }

    /// The installation prefix for this scope.
    ///
    /// An explicit `install.prefix` wins; otherwise system-wide goes to
    /// `/usr/local` and per-user to `~/.local`.
    ///
    /// # Errors
    ///
    /// Returns [`PyvmError::ConfigError`] when no home directory can be
    /// determined for a per-user install.
    fn install_prefix(&self) -> Result<PathBuf> {
        if let Some(prefix) = &self.prefix {
            return Ok(prefix.clone());
        }
        if self.system_wide {
            return Ok(PathBuf::from("/usr/local"));
        }
        dirs::home_dir()
            .map(|home| home.join(".local"))
            .ok_or_else(|| {
                PyvmError::ConfigError {
                    message: "could not determine home directory for install prefix".to_string(),
                }
                .into()
            })
    }

    /// Parallelism for `make -jN`.
    fn jobs(&self) -> usize {
        self.build_jobs.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        })
    }

    /// Verify every build prerequisite is on PATH.
    fn check_prerequisites(&self) -> Result<()> {
        if which::which("cc").is_err() && which::which("gcc").is_err() {
            return Err(PyvmError::MissingPrerequisite {
                tool: "cc (C compiler)".to_string(),
            }
            .into());
        }
        for tool in REQUIRED_TOOLS {
            which::which(tool).map_err(|_| PyvmError::MissingPrerequisite {
                tool: (*tool).to_string(),
            })?;
        }
        Ok(())
    }

    /// Confirm the alt-installed binary exists and reports `target`.
    async fn verify(&self, target: &VersionString) -> Result<InstallOutcome> {
        let binary = self
            .install_prefix()?
            .join("bin")
            .join(format!("python{}", target.major_minor()));
        let binary_path = binary.to_string_lossy().to_string();

        let result = run_step("verify", &binary_path, &["--version"], None).await?;
        let banner = format!("{}{}", result.stdout, result.stderr);
        if result.success && banner.contains(target.as_str()) {
            Ok(InstallOutcome::success(
                target,
                format!("Python {target} installed to {}", binary.display()),
            ))
        } else {
            Ok(InstallOutcome::failure(
                target,
                format!("installed binary at {} did not report {target}", binary.display()),
            ))
        }
    }
}

#[async_trait]
impl InstallStrategy for LinuxInstaller {
    fn os(&self) -> OsFamily {
        OsFamily::Linux
    }

    fn requires_elevation(&self) -> bool {
        self.system_wide
    }

    async fn install(&self, target: &VersionString) -> Result<InstallOutcome> {
        self.check_prerequisites()?;
        let prefix = self.install_prefix()?;
        let staging = tempfile::tempdir()?;

        let url = format!("{PYTHON_FTP_BASE}/{target}/Python-{target}.tgz");
        info!("Downloading Python {target} source tarball");
        let tarball = ArtifactDownloader::new()?.fetch(&url, staging.path()).await?;

        info!("Extracting source tarball");
        let tarball_path = tarball.to_string_lossy().to_string();
        let extract = run_step("extract", "tar", &["-xzf", &tarball_path], Some(staging.path()))
            .await?;
        if !extract.success {
            return Ok(outcome_from_step(target, "extract", &extract));
        }

        let source_dir = staging.path().join(format!("Python-{target}"));
        let prefix_arg = format!("--prefix={}", prefix.display());
        info!("Configuring build (prefix {})", prefix.display());
        let configure = run_step(
            "configure",
            "./configure",
            &[&prefix_arg],
            Some(&source_dir),
        )
        .await?;
        if !configure.success {
            return Ok(outcome_from_step(target, "configure", &configure));
        }

        let jobs = format!("-j{}", self.jobs());
        info!("Compiling Python {target}");
        let build = run_step("make", "make", &[&jobs], Some(&source_dir)).await?;
        if !build.success {
            return Ok(outcome_from_step(target, "make", &build));
        }

        // altinstall, never install: the unsuffixed python3 symlink must
        // stay pointed at the pre-existing interpreter.
        info!("Installing Python {target} (altinstall)");
        let install = run_step("altinstall", "make", &["altinstall"], Some(&source_dir)).await?;
        if !install.success {
            return Ok(outcome_from_step(target, "altinstall", &install));
        }

        self.verify(target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_defaults_follow_scope() {
        let per_user = LinuxInstaller::new(&InstallConfig::default());
        let prefix = per_user.install_prefix().unwrap();
        assert!(prefix.ends_with(".local"));

        let system = LinuxInstaller::new(&InstallConfig {
            system_wide: true,
            ..Default::default()
        });
        assert_eq!(system.install_prefix().unwrap(), PathBuf::from("/usr/local"));
    }

    #[test]
    fn explicit_prefix_overrides_scope() {
        let installer = LinuxInstaller::new(&InstallConfig {
            system_wide: true,
            prefix: Some(PathBuf::from("/opt/python")),
            ..Default::default()
        });
        assert_eq!(installer.install_prefix().unwrap(), PathBuf::from("/opt/python"));
    }

    #[test]
    fn jobs_prefers_configured_count() {
        let installer = LinuxInstaller::new(&InstallConfig {
            build_jobs: Some(3),
            ..Default::default()
        });
        assert_eq!(installer.jobs(), 3);

        let auto = LinuxInstaller::new(&InstallConfig::default());
        assert!(auto.jobs() >= 1);
    }
}
