//! HTTP fetcher with rate limiting and explicit cookie handling
//!
//! This module provides the HTTP client used by every site adapter:
//! - Browser-like default headers
//! - Global politeness rate limiting with governor
//! - Per-request timeouts surfaced as [`FetchError::Timeout`]
//! - Cookie jars passed in and `Set-Cookie` values handed back, never
//!   stored inside the client

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, SET_COOKIE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{HarvestConfig, DEFAULT_USER_AGENT};
use crate::crawler::cookies::CookieJar;
use crate::crawler::headers::{
    build_browser_headers, json_body_headers, with_cookie_header, ACCEPT_ANY, ACCEPT_HTML,
    ACCEPT_JSON,
};
use crate::utils::error::FetchError;

/// Per-request options for [`HttpFetcher::fetch_text`]
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Extra headers, overriding the defaults
    pub headers: HeaderMap,
    pub method: Method,
    pub body: Option<String>,
}

impl FetchOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            headers: HeaderMap::new(),
            method: Method::GET,
            body: None,
        }
    }
}

/// Body of a cookie-carrying request plus the cookies the server set
#[derive(Debug, Clone, Default)]
pub struct CookieResponse {
    pub text: String,
    /// Raw `Set-Cookie` header values in response order
    pub cookies: Vec<String>,
}

/// Shared HTTP client for all adapters
pub struct HttpFetcher {
    /// HTTP client with compression, without a cookie store
    client: Client,

    /// Rate limiter shared by every request of the batch
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher allowing `requests_per_second` requests
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_user_agent(requests_per_second, DEFAULT_USER_AGENT)
    }

    /// Create a fetcher with a custom user agent
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_user_agent(
        requests_per_second: u32,
        user_agent: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().gzip(true).build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            user_agent: user_agent.into(),
        })
    }

    /// Create a fetcher from the harvest settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &HarvestConfig) -> Result<Self, FetchError> {
        Self::with_user_agent(config.rate_limit, config.user_agent.clone())
    }

    /// Fetch a URL as text, failing on non-2xx status or timeout
    pub async fn fetch_text(&self, url: &str, opts: FetchOptions) -> Result<String, FetchError> {
        let mut headers = build_browser_headers(&self.user_agent, ACCEPT_ANY);
        headers.extend(opts.headers);

        let response = self
            .send(url, opts.method, headers, opts.body, opts.timeout)
            .await?;
        read_text(response, url, opts.timeout).await
    }

    /// GET a page carrying `jar` as the cookie header
    ///
    /// The jar is not modified; the caller merges [`CookieResponse::cookies`]
    /// into its own jar.
    pub async fn fetch_text_with_cookies(
        &self,
        url: &str,
        jar: &CookieJar,
        timeout: Duration,
    ) -> Result<CookieResponse, FetchError> {
        let headers = with_cookie_header(build_browser_headers(&self.user_agent, ACCEPT_HTML), jar);

        let response = self.send(url, Method::GET, headers, None, timeout).await?;

        let cookies = set_cookie_values(response.headers());

        let text = read_text(response, url, timeout).await?;
        Ok(CookieResponse { text, cookies })
    }

    /// Fetch and parse a JSON document
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        opts: FetchOptions,
    ) -> Result<T, FetchError> {
        let mut opts = opts;
        opts.headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        let text = self.fetch_text(url, opts).await?;
        parse_json(&text, url)
    }

    /// POST a JSON body and parse the JSON response
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, FetchError> {
        let body = serde_json::to_string(body)
            .map_err(|e| FetchError::Decode(format!("request body for {url}: {e}")))?;

        let opts = FetchOptions {
            timeout,
            headers: json_body_headers(),
            method: Method::POST,
            body: Some(body),
        };
        self.fetch_json(url, opts).await
    }

    async fn send(
        &self,
        url: &str,
        method: Method,
        headers: HeaderMap,
        body: Option<String>,
        timeout: Duration,
    ) -> Result<Response, FetchError> {
        reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %url, method = %method, "Fetching URL");

        let mut request = self
            .client
            .request(method, url)
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(e, url, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

async fn read_text(response: Response, url: &str, timeout: Duration) -> Result<String, FetchError> {
    response
        .text()
        .await
        .map_err(|e| map_transport_error(e, url, timeout))
}

fn map_transport_error(error: reqwest::Error, url: &str, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        FetchError::Http(error)
    }
}

fn parse_json<T: DeserializeOwned>(text: &str, url: &str) -> Result<T, FetchError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::debug!(url = %url, error = %e, "Response body is not valid JSON");
        FetchError::InvalidJson {
            url: url.to_string(),
        }
    })
}

/// Every `Set-Cookie` value; non-ASCII bytes are decoded lossily, never dropped
fn set_cookie_values(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| match v.to_str() {
            Ok(text) => text.to_string(),
            Err(_) => {
                let lossy = String::from_utf8_lossy(v.as_bytes()).into_owned();
                tracing::debug!(cookie = %lossy, "Set-Cookie value is not visible ASCII");
                lossy
            }
        })
        .collect()
}
