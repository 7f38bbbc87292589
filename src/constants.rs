//! Global constants used throughout the pyvm codebase.
//!
//! This module contains endpoints, timeout durations, and retry parameters
//! that are used across multiple modules. Defining them centrally improves
//! maintainability and makes magic numbers more discoverable.

use std::time::Duration;

/// The python.org downloads index queried for the latest published release.
///
/// The page advertises the current release as `Download Python X.Y.Z`,
/// which the resolver extracts and validates. Overridable per-run through
/// `resolver.endpoint` in the global config.
pub const PYTHON_RELEASES_URL: &str = "https://www.python.org/downloads/";

/// Base URL for official release artifacts (installers, tarballs, pkgs).
///
/// Artifacts live under `{base}/{version}/`, e.g.
/// `https://www.python.org/ftp/python/3.12.4/python-3.12.4-amd64.exe`.
pub const PYTHON_FTP_BASE: &str = "https://www.python.org/ftp/python";

/// Default number of attempts for remote version resolution.
///
/// Transient failures (transport errors, timeouts, 5xx responses) are
/// retried up to this many total attempts. Non-transient failures never
/// retry.
pub const DEFAULT_RESOLVE_ATTEMPTS: u32 = 3;

/// Starting delay for resolver exponential backoff (1 second).
///
/// The delay doubles on each retry attempt, capped at
/// [`MAX_RESOLVE_DELAY`].
pub const DEFAULT_RESOLVE_BASE_DELAY_MS: u64 = 1_000;

/// Maximum backoff delay between resolution attempts (30 seconds).
pub const MAX_RESOLVE_DELAY: Duration = Duration::from_secs(30);

/// Per-attempt timeout for resolution requests (10 seconds).
///
/// Applies to each network attempt individually, not to the resolution
/// operation as a whole.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for artifact downloads (10 minutes).
///
/// Installer executables and source tarballs are tens of megabytes;
/// this bounds a stalled transfer without cutting off slow links.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Environment variable overriding the global config path.
pub const CONFIG_ENV_VAR: &str = "PYVM_CONFIG";

/// Environment variable that disables progress bars when set.
pub const NO_PROGRESS_ENV_VAR: &str = "PYVM_NO_PROGRESS";
