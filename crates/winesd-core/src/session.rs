use std::io::Write;

use once_cell::unsync::OnceCell;
use tracing::{debug, info};
use winesd_archive::{CabExtractor, MemberExtractor};
use winesd_fetch::{DownloadReport, FetchError, FetchOptions, Fetcher, HttpClient};

use crate::catalog::{CATALOG_MEMBER, Catalog, Choice, Field, ProductEntry};
use crate::download::download_product;
use crate::error::{Error, Result};
use crate::matcher::{Criteria, Filter, match_eula, match_product};
use crate::release::Release;

/// Catalog access for one release.
///
/// The catalog is fetched, extracted and parsed on first use and reused for
/// the rest of the session. A failed load is not cached.
pub struct Session<C: HttpClient, X: MemberExtractor = CabExtractor> {
    release: Release,
    fetcher: Fetcher<C>,
    extractor: X,
    catalog: OnceCell<Catalog>,
}

impl<C: HttpClient> Session<C> {
    pub fn new(release: Release, client: C) -> Self {
        Self::with_extractor(release, client, CabExtractor)
    }
}

impl<C: HttpClient, X: MemberExtractor> Session<C, X> {
    pub fn with_extractor(release: Release, client: C, extractor: X) -> Self {
        Self {
            release,
            fetcher: Fetcher::new(client),
            extractor,
            catalog: OnceCell::new(),
        }
    }

    pub fn release(&self) -> Release {
        self.release
    }

    pub fn fetcher(&self) -> &Fetcher<C> {
        &self.fetcher
    }

    pub fn catalog(&self) -> Result<&Catalog> {
        self.catalog.get_or_try_init(|| self.load_catalog())
    }

    fn load_catalog(&self) -> Result<Catalog> {
        let url = self.release.catalog_url();
        info!(release = %self.release, url, "retrieving catalog");

        let mut staged = tempfile::Builder::new()
            .prefix("winesd-")
            .suffix(".cab")
            .tempfile()
            .map_err(Error::Staging)?;
        let bytes = self
            .fetcher
            .fetch_to(url, staged.as_file_mut(), &FetchOptions::default())
            .map_err(staging_error)?;
        debug!(bytes, path = %staged.path().display(), "catalog archive staged");

        let xml = self.extractor.extract(staged.path(), CATALOG_MEMBER)?;
        let catalog = Catalog::from_bytes(&xml)?;
        info!(
            products = catalog.products.len(),
            eulas = catalog.eulas.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// The single product matching `criteria`.
    pub fn product(&self, criteria: &Criteria) -> Result<&ProductEntry> {
        Ok(match_product(self.catalog()?, criteria)?)
    }

    /// EULA URL for `language_code`.
    pub fn eula_url(&self, language_code: &str) -> Result<&str> {
        Ok(match_eula(self.catalog()?, language_code)?)
    }

    pub fn choices(&self, filter: &Filter, field: Field) -> Result<Vec<Choice>> {
        Ok(self.catalog()?.choices(filter, field))
    }

    pub fn download<W: Write>(
        &self,
        entry: &ProductEntry,
        sink: W,
        options: &FetchOptions,
    ) -> Result<DownloadReport> {
        info!(file = %entry.file_name, size = entry.size, "downloading");
        download_product(&self.fetcher, entry, sink, options)
    }
}

/// Sink failures while staging are reported as `Staging`.
fn staging_error(e: FetchError) -> Error {
    match e {
        FetchError::Io(e) => Error::Staging(e),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn staging_write_failure_is_staging_error() {
        let full = io::Error::new(io::ErrorKind::StorageFull, "No space left on device");
        assert!(matches!(staging_error(FetchError::Io(full)), Error::Staging(_)));
    }

    #[test]
    fn other_staging_failures_keep_their_kind() {
        let e = FetchError::InvalidRequest("empty URL".into());
        assert!(matches!(staging_error(e), Error::InvalidEntry(_)));
        let e = FetchError::Cancelled { bytes_downloaded: 3 };
        assert!(matches!(staging_error(e), Error::Cancelled { bytes_downloaded: 3 }));
    }
}
