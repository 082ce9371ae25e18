use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::http::{HttpClient, Response};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MemoryError(pub String);

#[derive(Debug, Clone)]
enum Route {
    Body { data: Arc<[u8]>, breaks: bool },
    Fail(String),
}

/// In-memory `HttpClient` serving fixed bodies per URL.
///
/// Counts every request so callers can assert how often the network would
/// have been hit. Reads hand out at most `read_size` bytes at a time.
#[derive(Debug)]
pub struct MemoryClient {
    routes: HashMap<String, Route>,
    read_size: usize,
    requests: AtomicUsize,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
            read_size: usize::MAX,
            requests: AtomicUsize::new(0),
        }
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_body(mut self, url: &str, data: impl Into<Vec<u8>>) -> Self {
        let data: Vec<u8> = data.into();
        self.routes.insert(url.to_string(), Route::Body { data: data.into(), breaks: false });
        self
    }

    /// Serve `data`, then fail the next read as if the connection dropped.
    #[must_use]
    pub fn with_broken_body(mut self, url: &str, data: impl Into<Vec<u8>>) -> Self {
        let data: Vec<u8> = data.into();
        self.routes.insert(url.to_string(), Route::Body { data: data.into(), breaks: true });
        self
    }

    #[must_use]
    pub fn with_failure(mut self, url: &str, message: &str) -> Self {
        self.routes.insert(url.to_string(), Route::Fail(message.to_string()));
        self
    }

    #[must_use]
    pub fn read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size.max(1);
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl HttpClient for MemoryClient {
    type Error = MemoryError;

    fn get(&self, url: &str) -> Result<Response, Self::Error> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match self.routes.get(url) {
            Some(Route::Body { data, breaks }) => Ok(Response {
                content_length: Some(data.len() as u64),
                body: Box::new(MemoryBody {
                    data: Cursor::new(Arc::clone(data)),
                    read_size: self.read_size,
                    breaks: *breaks,
                }),
            }),
            Some(Route::Fail(message)) => Err(MemoryError(message.clone())),
            None => Err(MemoryError(format!("404 Not Found: {url}"))),
        }
    }
}

struct MemoryBody {
    data: Cursor<Arc<[u8]>>,
    read_size: usize,
    breaks: bool,
}

impl Read for MemoryBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = buf.len().min(self.read_size);
        let n = self.data.read(&mut buf[..limit])?;
        if n == 0 && self.breaks && !buf.is_empty() {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"));
        }
        Ok(n)
    }
}
