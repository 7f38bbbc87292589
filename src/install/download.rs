//! Streamed artifact downloads with progress reporting.

use crate::constants::{DOWNLOAD_TIMEOUT, NO_PROGRESS_ENV_VAR};
use crate::core::PyvmError;
use anyhow::Result;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Downloads release artifacts from python.org into a staging directory.
///
/// Responses are streamed to disk rather than buffered, since installer
/// executables and source tarballs run to tens of megabytes. A progress
/// bar is shown unless `PYVM_NO_PROGRESS` is set.
pub struct ArtifactDownloader {
    client: reqwest::Client,
}

impl ArtifactDownloader {
    /// Create a downloader with the long-transfer timeout applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(concat!("pyvm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| PyvmError::NetworkError {
                operation: "client setup".to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Download `url` into `dest_dir`, returning the path of the saved file.
    ///
    /// The file name is taken from the final path segment of the URL.
    ///
    /// # Errors
    ///
    /// Returns [`PyvmError::DownloadFailed`] for transport errors and
    /// non-success HTTP statuses, and IO errors for filesystem failures.
    pub async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = url.rsplit('/').next().filter(|s| !s.is_empty()).ok_or_else(|| {
            PyvmError::DownloadFailed {
                url: url.to_string(),
                reason: "URL has no file name component".to_string(),
            }
        })?;
        let dest = dest_dir.join(file_name);

        debug!("Downloading {url} -> {}", dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| PyvmError::DownloadFailed {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(PyvmError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP status {}", response.status()),
            }
            .into());
        }

        let total = response.content_length().unwrap_or(0);
        let progress = make_progress(file_name, total);

        let mut file = tokio::fs::File::create(&dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| PyvmError::DownloadFailed {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress.set_position(written);
        }

        file.flush().await?;
        progress.finish_and_clear();
        debug!("Downloaded {written} bytes to {}", dest.display());

        Ok(dest)
    }
}

fn make_progress(file_name: &str, total: u64) -> ProgressBar {
    if std::env::var_os(NO_PROGRESS_ENV_VAR).is_some() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    ) {
        bar.set_style(style.progress_chars("##-"));
    }
    bar.set_prefix(file_name.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downloader_builds() {
        assert!(ArtifactDownloader::new().is_ok());
    }

    #[tokio::test]
    async fn fetch_rejects_url_without_file_name() {
        let downloader = ArtifactDownloader::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = downloader
            .fetch("https://www.python.org/ftp/python/", dir.path())
            .await
            .unwrap_err();
        let err = err.downcast::<PyvmError>().unwrap();
        assert!(matches!(err, PyvmError::DownloadFailed { .. }));
    }
}
