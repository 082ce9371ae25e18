use std::io::{ErrorKind, Read, Write};

use tracing::{debug, info, warn};
use winesd_verify::{Expected, Sha1Digest, Sha1Hasher, VerifiedWriter};

use crate::data::{FetchOptions, FetchPhase, Progress};
use crate::effects::http::{HttpClient, Response};
use crate::error::{FetchError, Result};

/// Outcome of a verified download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub bytes_written: u64,
    pub digest: Sha1Digest,
}

/// Streams response bodies into caller-provided sinks.
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Copy the body at `url` into `sink` without verification.
    ///
    /// Used for staging small resources such as the catalog archive.
    pub fn fetch_to<W: Write>(&self, url: &str, sink: &mut W, options: &FetchOptions) -> Result<u64> {
        let response = self.connect(url, None, options)?;
        let total = response.content_length;
        let bytes = self.pump(url, response.body, sink, total, options)?;
        sink.flush()?;

        options.report(Progress {
            phase: FetchPhase::Completed,
            bytes_downloaded: bytes,
            total_bytes: total,
        });
        debug!(url, bytes, "fetched");
        Ok(bytes)
    }

    /// Stream `url` into `sink`, hashing and counting every chunk, then check
    /// the total size and SHA-1 against `expected`.
    ///
    /// The sink is consumed and dropped on every exit path. On an integrity
    /// failure it keeps whatever was written; cleanup is the caller's call.
    pub fn download<W: Write>(
        &self,
        url: &str,
        expected: &Expected,
        sink: W,
        options: &FetchOptions,
    ) -> Result<DownloadReport> {
        if url.is_empty() {
            return Err(FetchError::InvalidRequest("empty download URL".to_string()));
        }
        if expected.size == 0 {
            return Err(FetchError::InvalidRequest("expected size must be positive".to_string()));
        }

        let total = Some(expected.size);
        let response = self.connect(url, total, options)?;
        if let Some(len) = response.content_length.filter(|len| *len != expected.size) {
            debug!(url, content_length = len, expected = expected.size, "content length differs from catalog size");
        }

        let mut writer = VerifiedWriter::new(sink, Sha1Hasher::new());
        let bytes = self.pump(url, response.body, &mut writer, total, options)?;

        options.report(Progress {
            phase: FetchPhase::Verifying,
            bytes_downloaded: bytes,
            total_bytes: total,
        });
        let verified = writer.finish(expected).map_err(FetchError::from).inspect_err(|e| {
            if let FetchError::Integrity(err) = e {
                warn!(url, kind = %err.kind, "integrity check failed");
            }
        })?;

        options.report(Progress {
            phase: FetchPhase::Completed,
            bytes_downloaded: verified.bytes_written,
            total_bytes: total,
        });
        info!(url, bytes = verified.bytes_written, sha1 = %verified.digest, "download verified");
        Ok(DownloadReport {
            bytes_written: verified.bytes_written,
            digest: verified.digest,
        })
    }

    fn connect(&self, url: &str, total: Option<u64>, options: &FetchOptions) -> Result<Response> {
        options.report(Progress {
            phase: FetchPhase::Connecting,
            bytes_downloaded: 0,
            total_bytes: total,
        });
        debug!(url, "connecting");
        self.client.get(url).map_err(|e| FetchError::network(url, e))
    }

    /// Chunk loop shared by both transfer kinds: one progress report per
    /// chunk, cancellation checked before each read.
    fn pump<R: Read, W: Write>(
        &self,
        url: &str,
        mut body: R,
        sink: &mut W,
        total: Option<u64>,
        options: &FetchOptions,
    ) -> Result<u64> {
        let mut buf = vec![0u8; options.chunk_size.max(1)];
        let mut bytes_downloaded = 0u64;

        options.report(Progress {
            phase: FetchPhase::Downloading,
            bytes_downloaded,
            total_bytes: total,
        });

        loop {
            if options.is_cancelled() {
                return Err(FetchError::Cancelled { bytes_downloaded });
            }

            let n = match body.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FetchError::network(url, e)),
            };

            sink.write_all(&buf[..n])?;
            bytes_downloaded += n as u64;

            options.report(Progress {
                phase: FetchPhase::Downloading,
                bytes_downloaded,
                total_bytes: total,
            });
        }

        Ok(bytes_downloaded)
    }
}
