//! Blocking HTTP streaming with per-chunk progress and integrity verification.
//!
//! # Architecture
//!
//! - [`data`] - Options, phases and progress snapshots
//! - [`effects`] - The `HttpClient` seam and the `Fetcher` that drives it
//!
//! # Key Features
//!
//! - **Single-Pass**: bytes are hashed and counted while they are written
//! - **Typed integrity failures**: size and digest mismatches are values, not panics
//! - **Mechanism-Only**: no retries or cleanup policy; the caller decides

pub mod data;
pub mod effects;
mod error;

pub use data::{CancelToken, DEFAULT_CHUNK_SIZE, FetchOptions, FetchPhase, Progress};
pub use effects::{BoxRead, DownloadReport, Fetcher, HttpClient, Response};

#[cfg(any(test, feature = "test-util"))]
pub use effects::{MemoryClient, MemoryError};

#[cfg(feature = "reqwest")]
pub use effects::{ClientSetting, ClientSettingError, ReqwestClient};

pub use error::{FetchError, Result};
pub use winesd_verify::{Expected, IntegrityError, Mismatch, Sha1Digest};
