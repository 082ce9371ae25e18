use std::io::{self, Write};

use crate::{Hasher, IntegrityError, Mismatch, Result, Sha1Digest, Sha1Hasher};

/// Size and digest a completed stream must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected {
    pub size: u64,
    pub digest: Sha1Digest,
}

impl Expected {
    pub fn new(size: u64, digest: Sha1Digest) -> Self {
        Self { size, digest }
    }

    /// Compare observed values. Both checks always run so the error reports
    /// every failed check.
    pub fn check(&self, actual_size: u64, actual_digest: Sha1Digest) -> std::result::Result<(), IntegrityError> {
        let kind = match (actual_size == self.size, actual_digest == self.digest) {
            (true, true) => return Ok(()),
            (false, true) => Mismatch::Size,
            (true, false) => Mismatch::Digest,
            (false, false) => Mismatch::SizeAndDigest,
        };
        Err(IntegrityError {
            kind,
            expected_size: self.size,
            actual_size,
            expected_digest: self.digest,
            actual_digest,
        })
    }
}

/// Outcome of a stream that passed verification.
#[derive(Debug)]
pub struct Verified<W> {
    pub inner: W,
    pub bytes_written: u64,
    pub digest: Sha1Digest,
}

/// Streaming writer that hashes and counts data as it passes through.
/// Wraps any `Write` sink; only bytes the sink accepted are hashed.
pub struct VerifiedWriter<W, H = Sha1Hasher> {
    inner: W,
    hasher: H,
    written: u64,
}

impl<W, H> VerifiedWriter<W, H> {
    /// Create a new verified writer.
    pub fn new(inner: W, hasher: H) -> Self {
        Self { inner, hasher, written: 0 }
    }
}

impl<W: Write, H: Hasher> Write for VerifiedWriter<W, H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.written += n as u64;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write, H: Hasher<Output = Sha1Digest>> VerifiedWriter<W, H> {
    /// Flush the sink and verify against the expected size and digest.
    ///
    /// On mismatch the sink is dropped with whatever was written to it.
    pub fn finish(mut self, expected: &Expected) -> Result<Verified<W>> {
        self.inner.flush()?;
        let digest = self.hasher.finalize();
        expected.check(self.written, digest)?;
        Ok(Verified {
            inner: self.inner,
            bytes_written: self.written,
            digest,
        })
    }
}
