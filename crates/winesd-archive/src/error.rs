use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("'{path}' is not a cabinet archive")]
    UnsupportedFormat { path: PathBuf },

    #[error("archive is corrupted: {source}")]
    Corrupted {
        #[source]
        source: io::Error,
    },

    #[error("member '{member}' not found in archive (members: {})", .available.join(", "))]
    MemberNotFound { member: String, available: Vec<String> },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
