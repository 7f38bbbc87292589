//! Remote version resolution with bounded retry and exponential backoff.
//!
//! [`RemoteResolver`] queries the python.org downloads index for the
//! latest published release and extracts the advertised
//! `Download Python X.Y.Z` version. Transport errors, timeouts, and 5xx
//! responses are transient and retried with exponential backoff; 4xx
//! responses and malformed payloads are fatal immediately. A successfully
//! extracted version is still strictly validated before use; an
//! extraction that fails validation counts as a parse failure, never as a
//! silently accepted value.
//!
//! The retry loop itself is generic over the fetch operation so the
//! policy can be exercised without a network.

use crate::config::ResolverConfig;
use crate::constants::MAX_RESOLVE_DELAY;
use crate::core::PyvmError;
use crate::version::VersionString;
use anyhow::Result;
use regex::Regex;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

static DOWNLOAD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Download Python (\d+\.\d+\.\d+)").expect("valid release regex"));

/// A single fetch attempt's failure, classified for the retry policy.
#[derive(Debug)]
pub(crate) enum FetchError {
    /// Connection, DNS, or timeout failure. Transient.
    Transport(String),
    /// Non-success HTTP status. 5xx is transient, everything else fatal.
    Status(u16),
    /// The response arrived but no valid version could be extracted.
    Malformed(String),
}

impl FetchError {
    /// Whether the retry policy may try again after this failure.
    pub(crate) const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(code) => *code >= 500,
            Self::Malformed(_) => false,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(reason) => write!(f, "transport error: {reason}"),
            Self::Status(code) => write!(f, "unexpected HTTP status {code}"),
            Self::Malformed(reason) => write!(f, "malformed response: {reason}"),
        }
    }
}

/// Extract and validate the advertised release version from the index page.
pub(crate) fn extract_version(body: &str) -> Result<VersionString, FetchError> {
    let captured = DOWNLOAD_PATTERN
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| FetchError::Malformed("no 'Download Python X.Y.Z' marker found".into()))?;

    VersionString::parse(captured.as_str())
        .map_err(|err| FetchError::Malformed(err.to_string()))
}

/// The backoff schedule: `base_delay`, doubling per retry, capped at
/// [`MAX_RESOLVE_DELAY`].
///
/// `from_millis(2)` yields 2, 4, 8, ...; the factor scales that to
/// base, 2*base, 4*base, ... The factor is clamped to at least 1 so a
/// sub-2ms base never truncates to zero-length delays.
fn retry_delays(base_delay: Duration) -> impl Iterator<Item = Duration> {
    let base_ms = base_delay.as_millis().max(1) as u64;
    ExponentialBackoff::from_millis(2)
        .factor((base_ms / 2).max(1))
        .max_delay(MAX_RESOLVE_DELAY)
}

/// Run `op` up to `max_attempts` times with exponential backoff.
///
/// The delay starts at `base_delay` and doubles each attempt, capped at
/// [`MAX_RESOLVE_DELAY`]. Only transient failures are retried; the first
/// non-transient failure (or exhaustion) returns the attempt count along
/// with the last error.
pub(crate) async fn resolve_with_retry<F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<VersionString, (u32, FetchError)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<VersionString, FetchError>>,
{
    let mut delays = retry_delays(base_delay);
    let mut attempts = 0;
    loop {
        attempts += 1;
        match op().await {
            Ok(version) => return Ok(version),
            Err(err) if err.is_transient() && attempts < max_attempts => {
                let delay = delays.next().unwrap_or(MAX_RESOLVE_DELAY);
                warn!(
                    "Resolution attempt {attempts}/{max_attempts} failed ({err}), retrying in {delay:?}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err((attempts, err)),
        }
    }
}

/// Resolves the latest published Python release from a remote index.
pub struct RemoteResolver {
    client: reqwest::Client,
    endpoint: String,
    max_attempts: u32,
    base_delay: Duration,
}

impl RemoteResolver {
    /// Build a resolver from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("pyvm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| PyvmError::NetworkError {
                operation: "client construction".to_string(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        })
    }

    /// Resolve the latest published release version.
    ///
    /// Retries transient failures up to the configured attempt budget.
    /// The returned version has already passed strict validation.
    ///
    /// # Errors
    ///
    /// Returns [`PyvmError::ResolutionFailed`] carrying the last
    /// underlying cause once the budget is exhausted or a non-transient
    /// failure occurs.
    pub async fn resolve_latest(&self) -> Result<VersionString> {
        debug!("Resolving latest Python release from {}", self.endpoint);

        let version =
            resolve_with_retry(self.max_attempts, self.base_delay, || self.fetch_once())
                .await
                .map_err(|(attempts, err)| PyvmError::ResolutionFailed {
                    attempts,
                    reason: err.to_string(),
                })?;

        debug!("Latest published release: {}", version);
        Ok(version)
    }

    /// One network attempt: request the index and extract the version.
    async fn fetch_once(&self) -> Result<VersionString, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        extract_version(&body)
    }
}
