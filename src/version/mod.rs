//! Version strings, validation, and the update decision.
//!
//! Python release versions are plain `major.minor.patch` triples such as
//! `3.12.4`. [`VersionString`] enforces that shape at construction: any
//! string failing the strict numeric pattern is rejected before it can be
//! used in comparisons or file paths. Ordering is numeric by
//! (major, minor, patch): `3.9.0` is older than `3.10.0` even though it
//! sorts later as a string.
//!
//! [`decide`] is the pure comparison producing an [`UpdateDecision`]; it
//! is recomputed on every check and never persisted.

use crate::core::PyvmError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("valid version regex"));

/// A validated `major.minor.patch` Python version.
///
/// Construction goes through [`FromStr`] (or [`VersionString::parse`]) and
/// fails with [`PyvmError::InvalidVersion`] for anything that is not a
/// strict numeric triple: `"3.12"`, `"v3.12.4"`, and `"3.x.4"` are all
/// rejected. The value is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionString {
    raw: String,
    #[serde(skip)]
    parsed: semver::Version,
}

impl VersionString {
    /// Parse and validate a version string.
    ///
    /// # Errors
    ///
    /// Returns [`PyvmError::InvalidVersion`] if `s` does not match the
    /// strict `major.minor.patch` numeric pattern.
    pub fn parse(s: &str) -> Result<Self, PyvmError> {
        if !VERSION_PATTERN.is_match(s) {
            return Err(PyvmError::InvalidVersion {
                version: s.to_string(),
            });
        }

        let parsed = semver::Version::parse(s)?;
        Ok(Self {
            raw: s.to_string(),
            parsed,
        })
    }

    /// The version as text, e.g. `"3.12.4"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The `major.minor` prefix, e.g. `"3.12"`.
    ///
    /// Used for version-suffixed binary names (`python3.12`) and install
    /// locations so a new release coexists with the default interpreter.
    #[must_use]
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.parsed.major, self.parsed.minor)
    }
}

impl FromStr for VersionString {
    type Err = PyvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialOrd for VersionString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

/// Check whether `s` is a valid strict `major.minor.patch` version.
///
/// Pure validator exposed to front-ends for pre-flight checks and input
/// validation; [`VersionString::parse`] applies the same rule.
#[must_use]
pub fn validate_version_string(s: &str) -> bool {
    VERSION_PATTERN.is_match(s)
}

/// The outcome of comparing the local version against the latest release.
///
/// Produced by [`decide`]; has no independent lifecycle and is recomputed
/// on every check.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateDecision {
    /// The locally installed interpreter version.
    pub local: VersionString,
    /// The latest published release.
    pub latest: VersionString,
    /// Whether `latest` is numerically newer than `local`.
    pub needs_update: bool,
}

/// Compare local and latest versions and decide whether an update is needed.
///
/// `needs_update` is true iff `latest > local` under numeric
/// (major, minor, patch) ordering. Equal versions yield `false`.
#[must_use]
pub fn decide(local: &VersionString, latest: &VersionString) -> UpdateDecision {
    UpdateDecision {
        local: local.clone(),
        latest: latest.clone(),
        needs_update: latest > local,
    }
}
