//! Error types for winesd-fetch.

use std::error::Error as StdError;
use std::io;

use thiserror::Error;
use winesd_verify::{IntegrityError, VerificationError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid download request: {0}")]
    InvalidRequest(String),

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("failed writing downloaded data: {0}")]
    Io(#[source] io::Error),

    #[error("download is corrupted: {0}")]
    Integrity(#[source] IntegrityError),

    #[error("download cancelled after {bytes_downloaded} bytes")]
    Cancelled { bytes_downloaded: u64 },

    #[cfg(feature = "reqwest")]
    #[error(transparent)]
    ClientSetting(#[from] crate::effects::ClientSettingError),
}

impl FetchError {
    pub(crate) fn network(url: &str, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        FetchError::Network {
            url: url.to_string(),
            source: source.into(),
        }
    }
}

impl From<io::Error> for FetchError {
    fn from(e: io::Error) -> Self { FetchError::Io(e) }
}

impl From<IntegrityError> for FetchError {
    fn from(e: IntegrityError) -> Self { FetchError::Integrity(e) }
}

impl From<VerificationError> for FetchError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::Integrity(e) => FetchError::Integrity(e),
            VerificationError::Io(e) => FetchError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
