use std::io::Write;
use std::path::{Path, PathBuf};

use winesd_fetch::{DownloadReport, Expected, FetchOptions, Fetcher, HttpClient};

use crate::catalog::ProductEntry;
use crate::error::{Error, Result};

/// Stream `entry` into `sink`, verifying its catalog size and SHA-1.
///
/// An integrity failure leaves the written bytes in the sink. The caller
/// decides whether to keep or remove them.
pub fn download_product<C: HttpClient, W: Write>(
    fetcher: &Fetcher<C>,
    entry: &ProductEntry,
    sink: W,
    options: &FetchOptions,
) -> Result<DownloadReport> {
    if entry.file_path.trim().is_empty() {
        return Err(Error::InvalidEntry(format!("{} has no download URL", entry.file_name)));
    }
    if entry.size == 0 {
        return Err(Error::InvalidEntry(format!("{} has a zero size", entry.file_name)));
    }

    let expected = Expected::new(entry.size, entry.sha1);
    Ok(fetcher.download(&entry.file_path, &expected, sink, options)?)
}

/// Where to save `entry`.
///
/// Without `output` this is the catalog file name in the working directory.
/// An existing directory receives the catalog file name; any other path is
/// used as given. Only the final component of the catalog name is used.
pub fn default_destination(entry: &ProductEntry, output: Option<&Path>) -> Result<PathBuf> {
    match output {
        Some(path) if !path.is_dir() => Ok(path.to_path_buf()),
        Some(dir) => Ok(dir.join(safe_file_name(&entry.file_name)?)),
        None => Ok(PathBuf::from(safe_file_name(&entry.file_name)?)),
    }
}

fn safe_file_name(name: &str) -> Result<&str> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if last.is_empty() || last == "." || last == ".." {
        return Err(Error::InvalidEntry(format!("unusable file name {name:?}")));
    }
    Ok(last)
}
