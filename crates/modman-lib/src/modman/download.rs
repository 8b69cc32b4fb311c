//! Streaming, checksum-verified downloads
//!
//! Bytes land in a `.part` temporary file inside the destination directory
//! and are renamed into place only after the digest matches. A dropped or
//! failed download removes its temporary file.

use crate::modman::errors::DownloadError;
use crate::modman::manifest::InstalledMod;
use crate::networking::RateLimitedClient;
use indicatif::ProgressStyle;
use sha2::{Digest, Sha512};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{Instrument, debug, info_span, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

#[derive(Clone)]
pub struct Downloader {
    http: Arc<RateLimitedClient>,
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg} [{wide_bar}] {bytes}/{total_bytes}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Reject names that would escape the destination directory
pub fn checked_file_name(name: &str) -> Result<&str, DownloadError> {
    let plain = Path::new(name)
        .file_name()
        .is_some_and(|component| component == name);
    if plain && !name.contains('\\') {
        Ok(name)
    } else {
        Err(DownloadError::io(
            name,
            io::Error::new(io::ErrorKind::InvalidInput, "file name is not a plain name"),
        ))
    }
}

impl Downloader {
    pub fn new(http: Arc<RateLimitedClient>) -> Self {
        Self { http }
    }

    /// Download `url` to `dest`, returning the sha512 of the written bytes
    ///
    /// With `expected` set, a digest mismatch fails and nothing is written to `dest`.
    pub async fn fetch_file(
        &self,
        url: &str,
        dest: &Path,
        expected: Option<&str>,
    ) -> Result<String, DownloadError> {
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let label = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());

        let span = info_span!("download", file = %label);
        span.pb_set_style(&bar_style());
        span.pb_set_message(&label);

        self.stream_to(url, dir, dest, &label, expected)
            .instrument(span)
            .await
    }

    async fn stream_to(
        &self,
        url: &str,
        dir: &Path,
        dest: &Path,
        label: &str,
        expected: Option<&str>,
    ) -> Result<String, DownloadError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DownloadError::io(dir, e))?;

        let mut response = self.http.get(url).await?;
        if !response.status().is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        if let Some(length) = response.content_length() {
            tracing::Span::current().pb_set_length(length);
        }

        let temp = tempfile::Builder::new()
            .prefix(".modman-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| DownloadError::io(dir, e))?;
        let (file, temp_path) = temp.into_parts();
        let part: PathBuf = temp_path.to_path_buf();
        let mut file = tokio::fs::File::from_std(file);

        let mut hasher = Sha512::new();
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(&part, e))?;
            written += chunk.len() as u64;
            tracing::Span::current().pb_inc(chunk.len() as u64);
        }
        file.flush().await.map_err(|e| DownloadError::io(&part, e))?;
        file.sync_all().await.map_err(|e| DownloadError::io(&part, e))?;
        drop(file);

        let actual = format!("{:x}", hasher.finalize());
        if let Some(expected) = expected {
            if !actual.eq_ignore_ascii_case(expected) {
                warn!("checksum mismatch for {}, discarding download", label);
                return Err(DownloadError::ChecksumMismatch {
                    file_name: label.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        temp_path
            .persist(dest)
            .map_err(|e| DownloadError::io(dest, e.error))?;
        debug!("downloaded {} ({} bytes)", dest.display(), written);
        Ok(actual)
    }

    /// Fetch the primary file of `target` into `dest_dir`
    pub async fn fetch(
        &self,
        target: &InstalledMod,
        dest_dir: &Path,
    ) -> Result<InstalledMod, DownloadError> {
        let file_name = checked_file_name(&target.file_name)?;
        self.fetch_file(
            &target.download_url,
            &dest_dir.join(file_name),
            Some(&target.checksum),
        )
        .await?;
        Ok(target.clone())
    }
}

#[cfg(test)]
mod tests {
    include!("download.test.rs");
}
