use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use pluget_verify::{Algorithm, Checksum, Hasher, VerifyError};
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::data::{DownloadOptions, DownloadReport};
use crate::effects::http::HttpClient;
use crate::effects::transport::Transport;
use crate::error::{FetchError, Result, StreamError};

/// Downloads plugin archives into a caller-owned file, verifying them on the way.
pub struct ArchiveDownloader<C: HttpClient> {
    transport: Arc<Transport<C>>,
    options:   DownloadOptions,
}

impl<C: HttpClient> ArchiveDownloader<C> {
    pub fn new(transport: Arc<Transport<C>>) -> Self {
        Self { transport, options: DownloadOptions::default() }
    }

    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DownloadOptions { &self.options }

    /// Write the archive at `source` into `destination`.
    ///
    /// `source` is either an existing filesystem path, copied verbatim, or a
    /// URL. Remote archives are hashed while streaming and compared against
    /// `checksum` unless it is empty. A malformed response stream truncates the
    /// destination and starts over, at most `max_retries` times.
    ///
    /// The request has no timeout; cancel through `cancel`.
    pub async fn download(
        &self,
        plugin_name: &str,
        destination: &mut File,
        source: &str,
        checksum: &str,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport> {
        if tokio::fs::metadata(source).await.is_ok() {
            return copy_local(Path::new(source), destination).await;
        }

        let expected = match checksum.trim() {
            "" => None,
            checksum => Some(checksum.parse::<Checksum>().map_err(|source| FetchError::InvalidChecksum {
                plugin: plugin_name.to_string(),
                source,
            })?),
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FetchError::Cancelled),
                result = self.attempt(plugin_name, destination, source, expected.as_ref()) => result,
            };

            match result {
                Err(FetchError::Stream(StreamError::Corrupt(reason))) => {
                    if attempts > self.options.max_retries {
                        warn!(plugin = plugin_name, attempts, %reason, "giving up on corrupt response");
                        reset(destination).await?;
                        return Err(FetchError::CorruptResponse { attempts });
                    }
                    info!(plugin = plugin_name, attempts, %reason, "failed downloading, will retry");
                    reset(destination).await?;
                }
                Err(FetchError::Cancelled) => {
                    debug!(plugin = plugin_name, attempts, "download cancelled");
                    reset(destination).await?;
                    return Err(FetchError::Cancelled);
                }
                Ok(report) => return Ok(DownloadReport { attempts, ..report }),
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt(
        &self,
        plugin_name: &str,
        destination: &mut File,
        url: &str,
        expected: Option<&Checksum>,
    ) -> Result<DownloadReport> {
        debug!(plugin = plugin_name, url, "downloading archive");
        let mut body = self.transport.open_archive(url).await?;

        let algorithm = expected.map_or(Algorithm::Sha256, Checksum::algorithm);
        let mut hasher = algorithm.hasher();
        let mut writer = BufWriter::new(&mut *destination);
        let mut bytes = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            writer.write_all(&chunk).await.map_err(FetchError::Write)?;
            bytes += chunk.len() as u64;
        }
        writer.flush().await.map_err(FetchError::Write)?;
        drop(writer);

        let digest = hasher.finalize();
        if let Some(checksum) = expected {
            if let Err(VerifyError::Mismatch { expected, actual }) = checksum.verify(&digest) {
                reset(destination).await?;
                return Err(FetchError::ChecksumMismatch {
                    plugin: plugin_name.to_string(),
                    algorithm,
                    expected,
                    actual,
                    contact: self.options.security_contact.clone(),
                });
            }
        }

        Ok(DownloadReport { bytes, checksum: Some(hex::encode(digest)), attempts: 1 })
    }
}

async fn copy_local(path: &Path, destination: &mut File) -> Result<DownloadReport> {
    let local_err = |source| FetchError::LocalArchive { path: path.to_path_buf(), source };

    let mut file = File::open(path).await.map_err(local_err)?;
    let bytes = tokio::io::copy(&mut file, destination).await.map_err(local_err)?;
    destination.flush().await.map_err(FetchError::Write)?;

    debug!(path = %path.display(), bytes, "copied local plugin archive");
    Ok(DownloadReport { bytes, checksum: None, attempts: 1 })
}

/// Truncate and rewind so the file can be rewritten from scratch.
async fn reset(destination: &mut File) -> Result<()> {
    destination.set_len(0).await.map_err(FetchError::Write)?;
    destination.seek(SeekFrom::Start(0)).await.map_err(FetchError::Write)?;
    Ok(())
}
