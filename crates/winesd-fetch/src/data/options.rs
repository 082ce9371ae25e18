use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::progress::Progress;

/// Read size used when streaming a body.
pub const DEFAULT_CHUNK_SIZE: usize = 65535;

/// Phases of a download operation.
///
/// Downloads progress through these phases in order:
/// Connecting → Downloading → Verifying → Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Request sent, waiting for the response.
    #[default]
    Connecting,

    /// Streaming the body to the sink, one update per chunk.
    Downloading,

    /// Body fully written; size and digest are being compared.
    Verifying,

    /// Terminal state for successful transfers.
    Completed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Connecting => write!(f, "Connecting"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Verifying => write!(f, "Verifying"),
            FetchPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Cooperative cancellation flag, checked at every chunk boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Configuration for a single transfer.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use winesd_fetch::{FetchOptions, FetchPhase};
///
/// let options = FetchOptions::default()
///     .chunk_size(8192)
///     .on_progress(Arc::new(|progress| {
///         if progress.phase == FetchPhase::Downloading {
///             if let Some(pct) = progress.percentage() {
///                 print!("\r{pct:.0}%");
///             }
///         }
///     }));
/// assert_eq!(options.chunk_size, 8192);
/// ```
#[derive(Clone)]
pub struct FetchOptions {
    /// Maximum bytes read from the body per chunk.
    ///
    /// Default: 65535
    pub chunk_size: usize,

    /// Progress callback invoked on phase transitions and after every chunk.
    ///
    /// Default: None
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,

    /// Abort the transfer at the next chunk boundary once cancelled.
    ///
    /// Default: None
    pub cancel: Option<CancelToken>,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("chunk_size", &self.chunk_size)
            .field("on_progress", &"{ ... }")
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            on_progress: None,
            cancel: None,
        }
    }
}

impl FetchOptions {
    /// Set the chunk size. Zero is raised to one.
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    #[must_use]
    pub fn cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.on_progress {
            callback(&progress);
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}
