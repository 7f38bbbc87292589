//! Global configuration for pyvm.
//!
//! Settings live in `~/.pyvm/config.toml` (override with the `PYVM_CONFIG`
//! environment variable, which the `--config` CLI flag sets). Every field
//! has a default, so a missing file yields a fully working configuration.
//!
//! ```toml
//! [resolver]
//! max_attempts = 3
//! base_delay_ms = 1000
//! request_timeout_secs = 10
//!
//! [install]
//! system_wide = false
//! build_jobs = 4
//! ```

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_RESOLVE_ATTEMPTS, DEFAULT_RESOLVE_BASE_DELAY_MS,
    DEFAULT_REQUEST_TIMEOUT, PYTHON_RELEASES_URL,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Top-level configuration loaded from the global config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Remote version resolution settings.
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Installation strategy settings.
    #[serde(default)]
    pub install: InstallConfig,
}

/// Settings controlling remote version resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// The release index endpoint to query.
    ///
    /// Defaults to the python.org downloads page. Overriding this is
    /// mainly useful for mirrors and testing.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Total attempts for a resolution, counting the first (default 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Starting backoff delay in milliseconds (default 1000).
    ///
    /// The delay doubles on each subsequent attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Per-attempt request timeout in seconds (default 10).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Settings controlling installation strategies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Install for all users / into a system-scope prefix.
    ///
    /// Requires elevation. When false (the default), installs are
    /// per-user: `InstallAllUsers=0` on Windows, a prefix under the home
    /// directory on Linux.
    #[serde(default)]
    pub system_wide: bool,

    /// Override the Linux installation prefix.
    ///
    /// Defaults to `/usr/local` for system-wide installs and
    /// `~/.local` otherwise. `make altinstall` keeps the result
    /// version-suffixed either way.
    #[serde(default)]
    pub prefix: Option<PathBuf>,

    /// Parallel jobs for the Linux source build (`make -jN`).
    ///
    /// Defaults to the number of available CPUs.
    #[serde(default)]
    pub build_jobs: Option<usize>,
}

fn default_endpoint() -> String {
    PYTHON_RELEASES_URL.to_string()
}

const fn default_max_attempts() -> u32 {
    DEFAULT_RESOLVE_ATTEMPTS
}

const fn default_base_delay_ms() -> u64 {
    DEFAULT_RESOLVE_BASE_DELAY_MS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

impl GlobalConfig {
    /// Load the configuration from the default location.
    ///
    /// Returns defaults if no config file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load the configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid
    /// TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// The default config path.
    ///
    /// Honors the `PYVM_CONFIG` environment variable, otherwise
    /// `~/.pyvm/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        Ok(dirs::home_dir()
            .context("Could not determine home directory")?
            .join(".pyvm")
            .join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_are_sane() {
        let config = GlobalConfig::default();
        assert_eq!(config.resolver.max_attempts, 3);
        assert_eq!(config.resolver.base_delay_ms, 1000);
        assert_eq!(config.resolver.request_timeout_secs, 10);
        assert!(!config.install.system_wide);
        assert!(config.resolver.endpoint.contains("python.org"));
    }

    #[tokio::test]
    async fn load_from_parses_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[resolver]\nmax_attempts = 5\n").await.unwrap();

        let config = GlobalConfig::load_from(&path).await.unwrap();
        assert_eq!(config.resolver.max_attempts, 5);
        // untouched fields fall back to defaults
        assert_eq!(config.resolver.base_delay_ms, 1000);
    }

    #[tokio::test]
    async fn load_from_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "resolver = not toml").await.unwrap();

        assert!(GlobalConfig::load_from(&path).await.is_err());
    }

    #[test]
    #[serial]
    fn default_path_honors_env_override() {
        unsafe {
            std::env::set_var(CONFIG_ENV_VAR, "/tmp/pyvm-test-config.toml");
        }
        let path = GlobalConfig::default_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/pyvm-test-config.toml"));
        unsafe {
            std::env::remove_var(CONFIG_ENV_VAR);
        }
    }
}
