//! Platform probe: host OS family, CPU architecture, and elevation state.
//!
//! Identification is a compile-time `cfg!` check and can never fail; hosts
//! outside the three supported families report [`OsFamily::Unsupported`].
//! The elevation probe is queried fresh for every orchestration run, since
//! a long-lived front-end must not trust a stale privilege snapshot. It
//! degrades to `false` if the query cannot be answered, so callers always
//! see the conservative case.

use serde::Serialize;
use std::fmt;

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// Microsoft Windows
    Windows,
    /// Linux distributions
    Linux,
    /// Apple macOS
    MacOs,
    /// Anything else (no installation strategy available)
    Unsupported,
}

impl OsFamily {
    /// The family this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Unsupported
        }
    }

    /// Lowercase name matching `std::env::consts::OS` conventions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "darwin",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host identity: OS family plus CPU architecture tag.
///
/// Immutable for the process lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct OsIdentity {
    /// Operating system family
    pub family: OsFamily,
    /// Architecture tag, e.g. `x86_64` or `aarch64`
    pub arch: String,
}

/// Identify the host OS family and architecture.
///
/// Deterministic with no failure mode: unknown platforms come back as
/// [`OsFamily::Unsupported`] rather than an error.
#[must_use]
pub fn identify_os() -> OsIdentity {
    OsIdentity {
        family: OsFamily::current(),
        arch: std::env::consts::ARCH.to_string(),
    }
}

/// Whether the current process holds elevated privileges.
///
/// Effective UID zero on POSIX systems; membership in the Administrators
/// token on Windows. Never panics and returns `false` when the state
/// cannot be determined, so the orchestrator treats the conservative case
/// as "not elevated".
#[must_use]
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(windows)]
    {
        is_elevated::is_elevated()
    }
    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}
