use sha1::Digest;

use crate::Sha1Digest;

/// Incremental hash over a byte stream.
///
/// Feeding the same bytes in any chunking yields the same output.
pub trait Hasher: Send {
    type Output;

    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Self::Output;
}

pub struct Sha1Hasher(sha1::Sha1);

impl Hasher for Sha1Hasher {
    type Output = Sha1Digest;

    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Sha1Digest { to_digest(&self.0.finalize()) }
}

impl Default for Sha1Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha1Hasher {
    pub fn new() -> Self { Self(sha1::Sha1::new()) }

    pub fn digest(data: &[u8]) -> Sha1Digest { to_digest(&sha1::Sha1::digest(data)) }
}

fn to_digest(out: &[u8]) -> Sha1Digest {
    let mut bytes = [0u8; Sha1Digest::LEN];
    bytes.copy_from_slice(out);
    Sha1Digest::from_bytes(bytes)
}
