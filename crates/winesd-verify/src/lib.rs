//! Content verification primitives for downloaded images.
//!
//! Hashing happens while bytes move to their sink, so a multi-gigabyte ESD is
//! read from the network exactly once. Verification is a typed result, never a
//! panic: the caller decides what to do with a corrupted file.
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use winesd_verify::{Expected, Sha1Hasher, VerifiedWriter};
//!
//! let data = b"hello world";
//! let expected = Expected::new(data.len() as u64, Sha1Hasher::digest(data));
//!
//! let mut writer = VerifiedWriter::new(Vec::new(), Sha1Hasher::new());
//! writer.write_all(data).unwrap();
//!
//! let verified = writer.finish(&expected).unwrap();
//! assert_eq!(verified.bytes_written, 11);
//! ```

pub use self::digest::{ParseDigestError, Sha1Digest};
pub use self::error::{IntegrityError, Mismatch, Result, VerificationError};
pub use self::hasher::{Hasher, Sha1Hasher};
pub use self::writer::{Expected, Verified, VerifiedWriter};

mod digest;
mod error;
mod hasher;
mod writer;
