use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tracing::{debug, warn};
use winesd_core::{
    Criteria, FetchOptions, HttpClient, MemberExtractor, ProductEntry, Release, Session,
    default_destination,
};
use winesd_fetch::{ClientSetting, ReqwestClient};

use crate::cli::list::Listing;
use crate::ui::tracker::{ProgressTrackerBuilder, Tracker, TrackerBuilder};

#[derive(Clone, Debug, Parser)]
#[command(
    name = "winesd",
    version = env!("CARGO_PKG_VERSION"),
    about = "Download a Windows 10 or 11 ESD directly from Microsoft.",
    long_about = None
)]
pub struct App {
    /// Which Windows release to download. Currently 10 and 11 are supported.
    #[arg(allow_negative_numbers = true)]
    pub release: i64,

    /// Which Windows edition to download. Set to list to list editions.
    pub edition: String,

    /// Which Windows architecture to download. Set to list to list architectures.
    pub arch: String,

    /// Which Windows language to download. Set to list to list language codes.
    pub lang: String,

    /// Output file or directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Accept the Microsoft Windows EULA.
    #[arg(long = "accept_eula", visible_alias = "accept-eula")]
    pub accept_eula: bool,

    /// Get the URL to the EULA.
    #[arg(long = "get_eula", visible_alias = "get-eula")]
    pub get_eula: bool,

    /// Do not attempt to download, only print URL.
    #[arg(long = "get_url", visible_alias = "get-url")]
    pub get_url: bool,

    /// Print listings and matched entries as JSON.
    #[arg(long)]
    pub json: bool,

    /// Proxy for every request. May be repeated.
    #[arg(long = "proxy", value_name = "URL")]
    pub proxies: Vec<String>,

    /// Whole-request timeout in seconds. Unlimited by default.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// More logging on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl App {
    pub fn run(self) -> Result<()> {
        let release = Release::try_from(self.release)?;
        self.require_eula()?;

        let client = ReqwestClient::with_setting(self.client_setting())
            .context("failed to set up the HTTP client")?;
        let session = Session::new(release, client);

        let mut stdout = io::stdout().lock();
        self.execute(&session, &mut stdout)
    }

    fn require_eula(&self) -> Result<()> {
        if !(self.accept_eula || self.get_eula) {
            bail!("You must accept the Windows EULA! Rerun with --get_eula or --accept_eula");
        }
        Ok(())
    }

    fn client_setting(&self) -> ClientSetting {
        ClientSetting {
            proxies: self.proxies.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            user_agent: None,
        }
    }

    pub(crate) fn execute<C: HttpClient, X: MemberExtractor>(
        &self,
        session: &Session<C, X>,
        out: &mut impl Write,
    ) -> Result<()> {
        self.require_eula()?;

        if self.get_eula {
            let url = session.eula_url(&self.lang)?;
            writeln!(out, "The EULA is downloadable from: {url}")?;
            return Ok(());
        }

        if let Some(listing) = Listing::from_selection(&self.edition, &self.arch, &self.lang) {
            return listing.print(session, self.json, out);
        }

        let entry = session.product(&Criteria::new(&self.edition, &self.arch, &self.lang))?;
        debug!(file = %entry.file_name, size = entry.size, "matched product");

        if self.get_url {
            if self.json {
                serde_json::to_writer_pretty(&mut *out, entry)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", entry.file_path)?;
            }
            return Ok(());
        }

        self.download(session, entry, out)
    }

    fn download<C: HttpClient, X: MemberExtractor>(
        &self,
        session: &Session<C, X>,
        entry: &ProductEntry,
        out: &mut impl Write,
    ) -> Result<()> {
        let path = default_destination(entry, self.output.as_deref())?;
        let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;

        let tracker = ProgressTrackerBuilder::default()
            .with_len(entry.size)
            .with_prefix("Downloading")
            .with_finish("verified")
            .hidden(self.json)
            .build();
        let options = FetchOptions::default().on_progress(tracker.callback());

        match session.download(entry, BufWriter::new(file), &options) {
            Ok(_) => tracker.finish(),
            Err(e) => {
                tracker.abandon();
                warn!(path = %path.display(), "download left an unverified file");
                return Err(e).with_context(|| format!("failed to download {}", entry.file_name));
            }
        }

        writeln!(out, "Done! Saved to {}", path.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use winesd_core::{Error, MatchError};
    use winesd_fetch::{ClientSettingError, MemoryClient};

    use super::*;

    const PRODUCTS: &str = include_str!("../../../winesd-core/tests/fixtures/products.xml");
    const PRO_X64_EN_US: &str =
        "http://dl.delivery.mp.microsoft.com/filestreamingservice/files/pro-x64-en-us/19045.2006.x64.esd";

    /// Hands back the catalog text without reading the staged archive.
    struct FixtureExtractor;

    impl MemberExtractor for FixtureExtractor {
        fn extract(
            &self,
            _archive: &Path,
            _member: &str,
        ) -> std::result::Result<Vec<u8>, winesd_core::ExtractError> {
            Ok(PRODUCTS.as_bytes().to_vec())
        }
    }

    fn session(image: Vec<u8>) -> Session<MemoryClient, FixtureExtractor> {
        let client = MemoryClient::new()
            .with_body(Release::Windows10.catalog_url(), b"MSCF".to_vec())
            .with_body(PRO_X64_EN_US, image);
        Session::with_extractor(Release::Windows10, client, FixtureExtractor)
    }

    fn image() -> Vec<u8> {
        (0..70000).map(|i| (i * 31 % 256) as u8).collect()
    }

    fn app(args: &[&str]) -> App {
        App::try_parse_from(std::iter::once("winesd").chain(args.iter().copied())).unwrap()
    }

    fn execute(app: &App, session: &Session<MemoryClient, FixtureExtractor>) -> Result<String> {
        let mut out = Vec::new();
        app.execute(session, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_flags_and_aliases() {
        let a = app(&["11", "Professional", "x64", "en-us", "--accept-eula", "--get_url", "-o", "out.esd"]);
        assert_eq!(a.release, 11);
        assert!(a.accept_eula && a.get_url && !a.get_eula);
        assert_eq!(a.output.as_deref(), Some(Path::new("out.esd")));

        let a = app(&["10", "Pro", "x64", "en-us", "--get-eula", "--proxy", "http://p1", "--proxy", "http://p2", "-vv"]);
        assert!(a.get_eula);
        assert_eq!(a.verbose, 2);
        assert_eq!(a.client_setting().proxies, vec!["http://p1", "http://p2"]);
        assert_eq!(a.client_setting().timeout, None);
    }

    #[test]
    fn timeout_is_seconds() {
        let a = app(&["10", "Pro", "x64", "en-us", "--timeout", "30"]);
        assert_eq!(a.client_setting().timeout, Some(Duration::from_secs(30)));
        assert!(App::try_parse_from(["winesd", "10", "a", "b", "c", "--timeout", "-5"]).is_err());
    }

    #[test]
    fn invalid_proxy_fails_client_setup() {
        let err = app(&["10", "Pro", "x64", "en-us", "--accept_eula", "--proxy", "http://[invalid"])
            .run()
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to set up the HTTP client");
        assert!(matches!(
            err.downcast_ref::<ClientSettingError>(),
            Some(ClientSettingError::Proxy { url, .. }) if url == "http://[invalid"
        ));
    }

    #[test]
    fn missing_positionals_are_rejected() {
        assert!(App::try_parse_from(["winesd", "10", "Professional"]).is_err());
        assert!(App::try_parse_from(["winesd", "ten", "a", "b", "c"]).is_err());
    }

    #[test]
    fn eula_flag_is_required_before_any_request() {
        let session = session(image());
        let err = execute(&app(&["10", "Professional", "x64", "en-us"]), &session).unwrap_err();
        assert!(err.to_string().contains("--accept_eula"));
        assert_eq!(session.fetcher().client().requests(), 0);
    }

    #[test]
    fn unsupported_release_fails_before_network() {
        let err = app(&["7", "Professional", "x64", "en-us", "--accept_eula"]).run().unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnsupportedRelease(7))));
    }

    #[test]
    fn out_of_range_releases_are_unsupported_not_usage_errors() {
        for (arg, number) in [("-1", -1), ("4294967296", 4_294_967_296), ("-10", -10)] {
            let a = app(&[arg, "Professional", "x64", "en-us", "--accept_eula"]);
            assert_eq!(a.release, number);
            let err = a.run().unwrap_err();
            assert!(
                matches!(err.downcast_ref::<Error>(), Some(Error::UnsupportedRelease(n)) if *n == number),
                "{arg}: {err}"
            );
        }
    }

    #[test]
    fn prints_eula_url() {
        let out = execute(&app(&["10", "Professional", "x64", "en-us", "--get_eula"]), &session(image())).unwrap();
        assert_eq!(
            out,
            "The EULA is downloadable from: https://download.microsoft.com/eula/en-us/eula.rtf\n"
        );
    }

    #[test]
    fn prints_file_url() {
        let a = app(&["10", "Professional", "x64", "en-us", "--accept_eula", "--get_url"]);
        assert_eq!(execute(&a, &session(image())).unwrap(), format!("{PRO_X64_EN_US}\n"));
    }

    #[test]
    fn prints_entry_as_json() {
        let a = app(&["10", "Professional", "x64", "en-us", "--accept_eula", "--get_url", "--json"]);
        let out = execute(&a, &session(image())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["FilePath"], PRO_X64_EN_US);
        assert_eq!(value["Edition_Loc"], "%PRO%");
    }

    #[test]
    fn match_errors_propagate() {
        let a = app(&["10", "Education", "x64", "en-gb", "--accept_eula", "--get_url"]);
        let err = execute(&a, &session(image())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Match(MatchError::Ambiguous { .. }))
        ));
    }

    #[test]
    fn lists_architectures_for_edition() {
        let a = app(&["10", "Professional", "list", "en-us", "--accept_eula"]);
        let out = execute(&a, &session(image())).unwrap();
        assert!(out.contains("Available architectures for Windows 10"));
        assert!(out.contains("x64"));
        assert!(out.contains("x86"));
        assert!(out.contains("%ARCH_64%"));
    }

    #[test]
    fn lists_as_json() {
        let a = app(&["10", "list", "x64", "list", "--accept_eula", "--json"]);
        let out = execute(&a, &session(image())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["edition"][0]["value"], "Education");
        assert_eq!(value["edition"][1]["files"], 2);
        assert_eq!(value["language"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn downloads_into_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().to_string_lossy().into_owned();
        let a = app(&["10", "Professional", "x64", "en-us", "--accept_eula", "-o", &output, "--json"]);
        let out = execute(&a, &session(image())).unwrap();

        let saved = dir
            .path()
            .join("19045.2006.220908-0225.22h2_release_svc_refresh_CLIENTCONSUMER_RET_x64FRE_en-us.esd");
        assert_eq!(out, format!("Done! Saved to {}\n", saved.display()));
        assert_eq!(std::fs::read(saved).unwrap(), image());
    }

    #[test]
    fn corrupted_download_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("image.esd");
        let target_arg = target.to_string_lossy().into_owned();
        let a = app(&["10", "Professional", "x64", "en-us", "--accept_eula", "-o", &target_arg, "--json"]);

        let err = execute(&a, &session(image()[..1000].to_vec())).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Integrity(_))));
        assert_eq!(std::fs::metadata(&target).unwrap().len(), 1000);
    }
}
