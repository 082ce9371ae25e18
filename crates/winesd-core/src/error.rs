use std::io;

use thiserror::Error;
use winesd_fetch::FetchError;
use winesd_verify::IntegrityError;

use crate::matcher::MatchError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported Windows release {0} (supported: 10, 11)")]
    UnsupportedRelease(i64),

    #[error("network error: {0}")]
    Network(#[source] FetchError),

    #[error("failed to extract catalog: {0}")]
    Extraction(#[from] winesd_archive::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("download is corrupted: {0}")]
    Integrity(#[source] IntegrityError),

    #[error("invalid product entry: {0}")]
    InvalidEntry(String),

    #[error("failed to stage catalog archive: {0}")]
    Staging(#[source] io::Error),

    #[error("failed writing download: {0}")]
    Sink(#[source] io::Error),

    #[error("download cancelled after {bytes_downloaded} bytes")]
    Cancelled { bytes_downloaded: u64 },
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Integrity(e) => Error::Integrity(e),
            FetchError::InvalidRequest(msg) => Error::InvalidEntry(msg),
            FetchError::Io(e) => Error::Sink(e),
            FetchError::Cancelled { bytes_downloaded } => Error::Cancelled { bytes_downloaded },
            other => Error::Network(other),
        }
    }
}

/// The catalog document does not have the expected shape.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("catalog is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("catalog is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("catalog is missing element {path}")]
    MissingElement { path: String },

    #[error("{record} #{index} is missing field {field}")]
    MissingField {
        record: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("{record} #{index} has invalid {field} {value:?}: {reason}")]
    InvalidField {
        record: &'static str,
        index: usize,
        field: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
