//! Locate and download Windows installation images (ESD) from the vendor's
//! published media catalog.
//!
//! A [`Session`] fetches the catalog for one [`Release`] at most once, the
//! [`matcher`] resolves selection criteria to exactly one entry, and
//! [`Session::download`] streams that entry to a sink with size and SHA-1
//! verification.

pub mod catalog;
pub mod download;
mod error;
pub mod matcher;
pub mod release;
pub mod session;

pub use catalog::{CATALOG_MEMBER, Catalog, Choice, EulaEntry, Field, ProductEntry};
pub use download::{default_destination, download_product};
pub use error::{Error, ParseError, Result};
pub use matcher::{Criteria, Filter, MatchError, Record, Selection, match_eula, match_product};
pub use release::Release;
pub use session::Session;

pub use winesd_archive::{CabExtractor, Error as ExtractError, MemberExtractor};
pub use winesd_fetch::{CancelToken, DownloadReport, FetchOptions, FetchPhase, HttpClient, Progress};
pub use winesd_verify::{IntegrityError, Mismatch, Sha1Digest};
