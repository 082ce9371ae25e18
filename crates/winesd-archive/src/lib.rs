//! Member extraction from Microsoft cabinet (`.cab`) archives.
//!
//! # Architecture
//!
//! - `detect.rs` - Format detection by magic bytes
//! - `extract.rs` - Single-member extraction and the `MemberExtractor` seam
//!
//! Extraction works on a staged file because the cabinet directory is read by
//! seeking. Only the requested member is decompressed.

pub use detect::{ArchiveFormat, detect_format, detect_from_reader};
pub use error::{Error, Result};
pub use extract::{CabExtractor, MemberExtractor, extract_member, list_members};

mod detect;
mod error;
mod extract;
