use std::fmt;

use crate::error::Error;

/// Windows releases with a published media catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Release {
    Windows10,
    Windows11,
}

impl Release {
    pub const ALL: [Release; 2] = [Release::Windows10, Release::Windows11];

    pub fn number(self) -> u32 {
        match self {
            Release::Windows10 => 10,
            Release::Windows11 => 11,
        }
    }

    /// Location of the compressed catalog archive for this release.
    pub fn catalog_url(self) -> &'static str {
        match self {
            Release::Windows10 => "https://go.microsoft.com/fwlink?LinkId=841361",
            Release::Windows11 => "https://go.microsoft.com/fwlink?linkid=2156292",
        }
    }
}

impl TryFrom<i64> for Release {
    type Error = Error;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Release::ALL
            .into_iter()
            .find(|r| i64::from(r.number()) == n)
            .ok_or(Error::UnsupportedRelease(n))
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Windows {}", self.number())
    }
}
