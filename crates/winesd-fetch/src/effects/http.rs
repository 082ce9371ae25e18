use std::io::Read;

/// A boxed blocking body reader.
pub type BoxRead = Box<dyn Read + Send>;

/// An opened response whose body has not been read yet.
pub struct Response {
    pub body: BoxRead,

    /// Value of the Content-Length header, if the server sent one.
    pub content_length: Option<u64>,
}

/// Blocking HTTP client abstraction.
///
/// This trait provides the minimal interface needed for fetching operations.
/// Implementations handle their own redirect following, timeouts and the
/// mapping of non-success statuses to errors.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest::blocking`
/// - `MemoryClient`: in-memory routes for tests, behind the `test-util` feature
pub trait HttpClient {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a GET request and return the response with an unread body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (DNS failure, connection error,
    /// HTTP error status, etc.).
    fn get(&self, url: &str) -> Result<Response, Self::Error>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    type Error = C::Error;

    fn get(&self, url: &str) -> Result<Response, Self::Error> {
        (**self).get(url)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use reqwest::Proxy;
    use reqwest::blocking::Client;
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    pub enum ClientSettingError {
        #[error("Invalid proxy URL {url}: {source}")]
        Proxy {
            url: String,
            #[source]
            source: reqwest::Error,
        },

        #[error("Failed to build client: {0}")]
        Build(#[from] reqwest::Error),
    }

    /// Network settings applied to every request.
    #[derive(Debug, Clone, Default)]
    pub struct ClientSetting {
        /// Proxies for all schemes, tried in order. The standard proxy
        /// environment variables apply when this is empty.
        pub proxies: Vec<String>,

        /// Whole-request timeout. `None` disables it, which ESD downloads of
        /// several gigabytes need.
        pub timeout: Option<Duration>,

        pub user_agent: Option<String>,
    }

    impl ClientSetting {
        pub fn build(self) -> Result<Client, ClientSettingError> {
            let mut cb = Client::builder().timeout(self.timeout);

            for url in self.proxies {
                let proxy = Proxy::all(url.as_str())
                    .map_err(|source| ClientSettingError::Proxy { url: url.clone(), source })?;
                cb = cb.proxy(proxy);
            }

            let agent = self
                .user_agent
                .unwrap_or_else(|| concat!("winesd/", env!("CARGO_PKG_VERSION")).to_string());
            cb = cb.user_agent(agent);

            Ok(cb.build()?)
        }
    }

    /// Production HTTP client implementation using reqwest.
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with default configuration.
        pub fn new() -> Result<Self, ClientSettingError> {
            Self::with_setting(ClientSetting::default())
        }

        pub fn with_setting(setting: ClientSetting) -> Result<Self, ClientSettingError> {
            Ok(Self { client: setting.build()? })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        fn get(&self, url: &str) -> Result<Response, Self::Error> {
            let response = self.client.get(url).send()?.error_for_status()?;
            let content_length = response.content_length();
            Ok(Response {
                body: Box::new(response),
                content_length,
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientSetting, ClientSettingError, ReqwestClient};

#[cfg(all(test, feature = "reqwest"))]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn default_setting_builds() {
        assert!(ReqwestClient::new().is_ok());
    }

    #[test]
    fn proxies_and_timeout_are_accepted() {
        let setting = ClientSetting {
            proxies: vec!["http://127.0.0.1:3128".into(), "https://proxy.example:8443".into()],
            timeout: Some(Duration::from_secs(30)),
            user_agent: Some("winesd-test".into()),
        };
        assert!(setting.build().is_ok());
    }

    #[test]
    fn invalid_proxy_names_the_url() {
        let setting = ClientSetting {
            proxies: vec!["http://127.0.0.1:3128".into(), "http://[invalid".into()],
            ..Default::default()
        };
        match setting.build() {
            Err(ClientSettingError::Proxy { url, .. }) => assert_eq!(url, "http://[invalid"),
            other => panic!("expected proxy error, got {:?}", other.map(|_| ())),
        }
    }
}
