use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Request};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::error::{Error, Result};

/// Settings of a [`RestClient`]
#[derive(Clone, Debug)]
pub struct RestClientOptions {
    base_url: Url,
    debug: bool,
    timeout: Duration,
    connect_timeout: Duration,
    headers: Vec<(String, String)>,
}

impl RestClientOptions {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Total request deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            debug: false,
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            headers: default_headers(),
        }
    }

    pub fn builder() -> RestClientOptionsBuilder {
        RestClientOptionsBuilder::default()
    }

    /// Builder seeded with these options.
    pub fn to_builder(&self) -> RestClientOptionsBuilder {
        RestClientOptionsBuilder {
            base_url: Some(self.base_url.to_string()),
            debug: self.debug,
            timeout: Some(self.timeout),
            connect_timeout: Some(self.connect_timeout),
            headers: self.headers.clone(),
        }
    }
}

/// Builder for [`RestClientOptions`]
#[derive(Clone, Debug, Default)]
pub struct RestClientOptionsBuilder {
    // parsed in build()
    base_url: Option<String>,
    debug: bool,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    headers: Vec<(String, String)>,
}

impl RestClientOptionsBuilder {
    pub fn base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = Some(base_url.as_ref().to_string());
        self
    }

    /// Log every request and response at `info` level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Fails when no base URL was given or it does not parse.
    pub fn build(self) -> Result<RestClientOptions> {
        let Some(base_url) = self.base_url else {
            return Err(Error::InvalidArgument("base URL cannot be empty".to_string()));
        };

        let mut options = RestClientOptions::with_base_url(Url::parse(&base_url)?);
        options.debug = self.debug;
        if let Some(t) = self.timeout {
            options.timeout = t;
        }
        if let Some(ct) = self.connect_timeout {
            options.connect_timeout = ct;
        }
        options.headers.extend(self.headers);

        Ok(options)
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_headers() -> Vec<(String, String)> {
    vec![(
        String::from("User-Agent"),
        format!("restgen/{}", env!("CARGO_PKG_VERSION")),
    )]
}

/// The process-wide HTTP client used by generated builders
pub struct RestClient {
    inner: Client,
    // base URL without trailing '/', ready for `format!("{base}{path}")`
    base_url: String,
    options: RestClientOptions,
}

impl RestClient {
    pub fn new(options: RestClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &options.headers {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let inner = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .build()?;

        Ok(Self {
            inner,
            base_url: trimmed(&options.base_url),
            options,
        })
    }

    /// Client with default options for `base_url`.
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Self::new(RestClientOptions::with_base_url(base_url))
    }

    /// Wrap an already configured `reqwest` client.
    pub fn from_reqwest(inner: Client, base_url: impl AsRef<str>) -> Result<Self> {
        let options = RestClientOptions::with_base_url(Url::parse(base_url.as_ref())?);
        Ok(Self {
            inner,
            base_url: trimmed(&options.base_url),
            options,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn debug(&self) -> bool {
        self.options.debug
    }

    pub fn http_client(&self) -> &Client {
        &self.inner
    }

    pub fn options(&self) -> &RestClientOptions {
        &self.options
    }

    /// A `multipart/form-data` request with one part per field, in key order.
    pub fn multipart_request(
        &self,
        method: Method,
        url: Url,
        fields: &BTreeMap<String, Vec<u8>>,
    ) -> Result<Request> {
        let form = fields.iter().fold(Form::new(), |form, (key, value)| {
            form.part(key.clone(), Part::bytes(value.clone()))
        });
        Ok(self.inner.request(method, url).multipart(form).build()?)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("debug", &self.options.debug)
            .finish_non_exhaustive()
    }
}

fn trimmed(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_base_url() {
        let err = RestClientOptions::builder().build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = RestClientOptions::builder()
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn builder_overrides_defaults() {
        let options = RestClientOptions::builder()
            .base_url("http://localhost:8080/api/")
            .debug(true)
            .timeout(Duration::from_secs(2))
            .header("X-Api-Key", "secret")
            .build()
            .unwrap();

        assert!(options.debug());
        assert_eq!(options.timeout(), Duration::from_secs(2));
        assert_eq!(options.connect_timeout(), default_connect_timeout());
        assert_eq!(options.headers()[0].0, "User-Agent");
        assert_eq!(
            options.headers()[1],
            ("X-Api-Key".to_string(), "secret".to_string())
        );

        let rebuilt = options.to_builder().debug(false).build().unwrap();
        assert!(!rebuilt.debug());
        assert_eq!(rebuilt.base_url(), options.base_url());
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = RestClient::with_base_url("http://localhost:8080").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");

        let client = RestClient::with_base_url("http://localhost:8080/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn rejects_bad_default_header() {
        let options = RestClientOptions::builder()
            .base_url("http://localhost")
            .header("bad header", "x")
            .build()
            .unwrap();
        assert!(matches!(
            RestClient::new(options).unwrap_err(),
            Error::InvalidHeaderName(_)
        ));
    }

    #[test]
    fn multipart_request_sets_boundary() {
        let client = RestClient::with_base_url("http://localhost").unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("file".to_string(), b"hello".to_vec());
        let request = client
            .multipart_request(
                Method::POST,
                Url::parse("http://localhost/upload").unwrap(),
                &fields,
            )
            .unwrap();

        let content_type = request.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }
}
