//! Configuration and progress types passed between the fetcher and its caller.

pub mod options;
pub mod progress;

pub use options::{CancelToken, DEFAULT_CHUNK_SIZE, FetchOptions, FetchPhase};
pub use progress::Progress;
