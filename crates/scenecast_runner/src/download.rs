use std::path::{Path, PathBuf};

use cast_logging::{cast_error, cast_info};
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::persist::{atomic_write, PersistError};

/// Generated videos can be large, but not this large.
const MAX_RESULT_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed with status {0}")]
    HttpStatus(u16),
    #[error("result exceeds {MAX_RESULT_BYTES} bytes")]
    TooLarge,
    #[error("network error: {0}")]
    Network(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// A request to save a result URL under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDownload {
    pub url: String,
    /// Filename stem, e.g. `scenecast-image`.
    pub stem: String,
    /// Extension used when the URL path does not carry one.
    pub fallback_ext: String,
    pub dir: PathBuf,
}

/// Deterministic filename for a downloaded result:
/// `{stem}--{short_hash(url)}.{ext}`. Re-downloading the same URL lands on
/// the same file.
pub fn result_filename(stem: &str, url: &str, fallback_ext: &str) -> String {
    let ext = url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .and_then(|last| last.rsplit_once('.'))
                .map(|(_, ext)| ext.to_string())
        })
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| fallback_ext.to_string());
    format!("{stem}--{}.{ext}", short_hash(url))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

/// Fetches the result and writes it atomically. Outcomes are logged, never
/// fatal; this runs detached on the runner's runtime.
pub(crate) async fn run(download: ResultDownload) {
    match fetch_and_store(&download).await {
        Ok(path) => cast_info!("Saved {} to {:?}", download.url, path),
        Err(err) => cast_error!("Download of {} failed: {}", download.url, err),
    }
}

async fn fetch_and_store(download: &ResultDownload) -> Result<PathBuf, DownloadError> {
    let bytes = fetch_capped(&download.url).await?;
    let filename = result_filename(&download.stem, &download.url, &download.fallback_ext);
    store_bytes(&download.dir, &filename, &bytes)
}

async fn fetch_capped(url: &str) -> Result<Vec<u8>, DownloadError> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| DownloadError::Network(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus(status.as_u16()));
    }
    if let Some(len) = response.content_length() {
        if len > MAX_RESULT_BYTES {
            return Err(DownloadError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| DownloadError::Network(err.to_string()))?;
        if bytes.len() as u64 + chunk.len() as u64 > MAX_RESULT_BYTES {
            return Err(DownloadError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn store_bytes(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
    Ok(atomic_write(dir, filename, bytes)?)
}
