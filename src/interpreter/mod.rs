//! Local version detection for the installed Python interpreter.
//!
//! The detector locates an interpreter on PATH (`python3` first, then
//! `python`), runs it with `--version`, and parses the `Python X.Y.Z`
//! banner. Failure to find an interpreter or to read its version is fatal
//! for the current check; the orchestrator surfaces it without retrying.

use crate::core::PyvmError;
use crate::version::VersionString;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::debug;

/// Interpreter names probed on PATH, in order of preference.
const CANDIDATES: &[&str] = &["python3", "python"];

static BANNER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Python (\d+\.\d+\.\d+)").expect("valid banner regex"));

/// A located Python interpreter and its reported version.
#[derive(Debug, Clone)]
pub struct LocalInterpreter {
    /// Absolute path to the interpreter binary.
    pub path: PathBuf,
    /// The version it reports.
    pub version: VersionString,
}

/// Locate the default Python interpreter and detect its version.
///
/// Candidates are tried in order; one that exists on PATH but cannot
/// report a parseable version does not end the search. Windows ships a
/// `python3.exe` Store alias that behaves exactly that way, so a real
/// `python` further down the list must still be found.
///
/// # Errors
///
/// - [`PyvmError::InterpreterNotFound`] if no candidate exists on PATH
/// - [`PyvmError::DetectionFailed`] if every located candidate failed
///   to report a parseable version
pub async fn detect() -> Result<LocalInterpreter> {
    let mut last_failure = None;

    for name in CANDIDATES {
        let Ok(path) = which::which(name) else {
            continue;
        };
        debug!("Probing interpreter at {}", path.display());

        match query_version(&path).await {
            Ok(version) => {
                debug!("Installed Python version: {}", version);
                return Ok(LocalInterpreter {
                    path,
                    version,
                });
            }
            Err(err) => {
                debug!("{} reported no usable version: {err:#}", path.display());
                last_failure = Some(err);
            }
        }
    }

    Err(last_failure.unwrap_or_else(|| PyvmError::InterpreterNotFound.into()))
}

/// Detect only the installed version.
pub async fn detect_local_version() -> Result<VersionString> {
    Ok(detect().await?.version)
}

/// Run `<python> --version` and parse the banner.
async fn query_version(path: &std::path::Path) -> Result<VersionString> {
    let output = Command::new(path)
        .arg("--version")
        .output()
        .await
        .with_context(|| format!("Failed to execute {} --version", path.display()))?;

    // Historical CPython releases print the banner to stderr, current
    // ones to stdout; accept either.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let banner = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };

    parse_banner(&banner).map_err(anyhow::Error::from)
}

/// Extract a validated version from a `Python X.Y.Z` banner.
fn parse_banner(banner: &str) -> Result<VersionString, PyvmError> {
    let captured = BANNER_PATTERN
        .captures(banner)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| PyvmError::DetectionFailed {
            reason: format!("unrecognized version banner: {:?}", banner.trim()),
        })?;

    VersionString::parse(captured.as_str())
}
