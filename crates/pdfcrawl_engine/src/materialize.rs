use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use futures_util::StreamExt;
use pdfcrawl_core::{candidate_filename, DownloadRecord, FilenameAllocator, HttpConfig};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::retry::classify_reqwest_error;
use crate::{classify_http_status, FetchError, RetryDecision, RetryPolicy};

/// Upper bound on body bytes buffered before they are written out.
pub const WRITE_CHUNK_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub retry: RetryPolicy,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            redirect_limit: 10,
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&HttpConfig> for DownloadSettings {
    fn from(config: &HttpConfig) -> Self {
        Self {
            connect_timeout: config.download_timeout(),
            request_timeout: config.download_timeout(),
            redirect_limit: config.redirect_limit,
            retry: RetryPolicy {
                max_attempts: config.download_attempts,
                base_delay: config.backoff_base(),
                ..RetryPolicy::default()
            },
        }
    }
}

#[derive(Debug, Error)]
enum DownloadError {
    #[error("http status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("error writing file: {0}")]
    Io(#[from] io::Error),
    #[error("file is empty")]
    Empty,
}

/// Downloads discovered documents into one destination directory.
///
/// URLs are handled one at a time, in order. A URL whose resolved filename
/// already exists in the destination is skipped without a network call and
/// without a record.
pub struct Materializer {
    client: reqwest::Client,
    destination: PathBuf,
    retry: RetryPolicy,
    filenames: FilenameAllocator,
}

impl Materializer {
    pub fn new(destination: PathBuf, settings: DownloadSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::ClientSetup(err.to_string()))?;
        Ok(Self {
            client,
            destination,
            retry: settings.retry,
            filenames: FilenameAllocator::new(),
        })
    }

    pub async fn download_all<I, S>(&mut self, urls: I) -> Vec<DownloadRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        for (idx, url) in urls.into_iter().enumerate() {
            let url = url.as_ref();
            engine_info!("running #{} {}", idx, url);
            if let Some(record) = self.download_one(url).await {
                records.push(record);
            }
        }
        records
    }

    /// `None` when the target file already exists.
    pub async fn download_one(&mut self, url: &str) -> Option<DownloadRecord> {
        let file_name = self.filenames.resolve(candidate_filename(url));
        let path = self.destination.join(&file_name);
        if path.exists() {
            engine_info!("{} already present, skipping {}", file_name, url);
            return None;
        }

        let dl_status = match self.download_file(url, &path).await {
            Ok(bytes) => {
                engine_info!("File downloaded successfully: {} ({} bytes)", path.display(), bytes);
                true
            }
            Err(err) => {
                engine_warn!("Download failed for {} -> {}: {}", url, path.display(), err);
                remove_partial(&path).await;
                false
            }
        };

        Some(DownloadRecord {
            original_url: url.to_string(),
            file_name,
            dl_status,
        })
    }

    async fn download_file(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        let response = self.send_with_retry(url).await?;
        let mut file = File::create(path).await?;
        let written = stream_to_file(&mut file, response).await?;
        if written == 0 || tokio::fs::metadata(path).await?.len() == 0 {
            return Err(DownloadError::Empty);
        }
        Ok(written)
    }

    async fn send_with_retry(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let mut attempt = 1u32;
        loop {
            let (err, kind) = match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let code = response.status().as_u16();
                    (DownloadError::Status(code), classify_http_status(code))
                }
                Err(err) => {
                    let kind = classify_reqwest_error(&err);
                    (DownloadError::Request(err), kind)
                }
            };
            match self.retry.decide(attempt, kind) {
                RetryDecision::NoRetry => return Err(err),
                RetryDecision::RetryAfter(delay) => {
                    engine_info!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        attempt,
                        url,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Write the body through a buffer of at most [`WRITE_CHUNK_BYTES`].
async fn stream_to_file(file: &mut File, response: reqwest::Response) -> Result<u64, DownloadError> {
    let mut stream = response.bytes_stream();
    let mut pending: Vec<u8> = Vec::new();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        pending.extend_from_slice(&chunk);
        if pending.len() >= WRITE_CHUNK_BYTES {
            file.write_all(&pending).await?;
            written += pending.len() as u64;
            pending.clear();
        }
    }
    if !pending.is_empty() {
        file.write_all(&pending).await?;
        written += pending.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => engine_info!("Removed incomplete file {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => engine_warn!("Could not remove {}: {}", path.display(), err),
    }
}
