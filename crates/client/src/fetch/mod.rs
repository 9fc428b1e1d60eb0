//! Network side of the cache layer.
//!
//! ### Fetcher
//! - [`Fetcher`] issues the network request equivalent to an intercepted one.
//! - Any HTTP status is a successful fetch; only transport failures
//!   (offline, DNS, TLS, timeout) are errors.
//! - The body is drained before returning, so the response can be forked
//!   with [`StoredResponse::tee`] and handed to both the caller and the store.
//!
//! ### HttpFetcher
//! - reqwest with rustls, transparent gzip/brotli/deflate decoding.
//! - Max redirects: 5

use std::time::{Duration, Instant};

use reqwest::{Client, Method};
use url::Url;

use swcache_core::{AppConfig, Error, RequestKey, StoredResponse};

/// An outgoing request as seen by the interceptor.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    key: RequestKey,
    headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn new(key: RequestKey) -> Self {
        Self { key, headers: Vec::new() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    pub fn url(&self) -> &Url {
        self.key.url()
    }

    pub fn method(&self) -> &str {
        self.key.method()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Only GET requests are matched against or written to a store.
    pub fn is_cacheable(&self) -> bool {
        self.key.method() == "GET"
    }
}

impl From<RequestKey> for FetchRequest {
    fn from(key: RequestKey) -> Self {
        Self::new(key)
    }
}

/// Issues network requests on behalf of the worker components.
///
/// Every response header is kept. Values that are not valid UTF-8 are
/// decoded lossily.
///
/// The status text is the canonical reason phrase for the status code, not
/// the phrase the server sent; statuses without one get an empty string.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a request and drain its body.
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, Error>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "swcache/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "swcache/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// reqwest-backed [`Fetcher`].
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid HTTP method {}: {}", request.method(), e)))?;

        let mut builder = self.http.request(method, request.url().as_str());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{}: {}", request.url(), e)))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response from {}: {}", request.url(), e)))?;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method(),
            request.url(),
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(StoredResponse::new(status.as_u16(), status_text)
            .with_headers(headers)
            .with_body(body))
    }
}
