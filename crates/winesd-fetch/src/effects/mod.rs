//! I/O side of the crate: the HTTP seam and the fetcher driving it.

mod fetcher;
mod http;
#[cfg(any(test, feature = "test-util"))]
mod memory;

pub use fetcher::{DownloadReport, Fetcher};
pub use http::{BoxRead, HttpClient, Response};
#[cfg(any(test, feature = "test-util"))]
pub use memory::{MemoryClient, MemoryError};

#[cfg(feature = "reqwest")]
pub use http::{ClientSetting, ClientSettingError, ReqwestClient};
