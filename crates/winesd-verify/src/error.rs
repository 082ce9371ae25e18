use std::fmt;
use std::io;

use crate::Sha1Digest;

/// Which integrity check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    Size,
    Digest,
    SizeAndDigest,
}

impl Mismatch {
    pub fn size_failed(self) -> bool {
        matches!(self, Mismatch::Size | Mismatch::SizeAndDigest)
    }

    pub fn digest_failed(self) -> bool {
        matches!(self, Mismatch::Digest | Mismatch::SizeAndDigest)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Size => write!(f, "size mismatch"),
            Mismatch::Digest => write!(f, "SHA-1 mismatch"),
            Mismatch::SizeAndDigest => write!(f, "size and SHA-1 mismatch"),
        }
    }
}

/// The written content does not match what the catalog promised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{kind}: expected {expected_size} bytes with SHA-1 {expected_digest}, \
     got {actual_size} bytes with SHA-1 {actual_digest}"
)]
pub struct IntegrityError {
    pub kind: Mismatch,
    pub expected_size: u64,
    pub actual_size: u64,
    pub expected_digest: Sha1Digest,
    pub actual_digest: Sha1Digest,
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerificationError>;
