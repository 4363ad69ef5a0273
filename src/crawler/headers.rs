use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, USER_AGENT};

use crate::crawler::cookies::CookieJar;

/// Accept header for mixed HTML/JSON requests
pub const ACCEPT_ANY: &str = "text/html,application/json;q=0.9,*/*;q=0.8";

/// Accept header for HTML page requests
pub const ACCEPT_HTML: &str = "text/html,*/*";

/// Accept header for JSON feeds
pub const ACCEPT_JSON: &str = "application/json,*/*";

const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.8,de-DE;q=0.7,de;q=0.6";

/// Build browser-like headers sent with every request
///
/// # Examples
///
/// ```
/// use jobharvest::crawler::headers::{build_browser_headers, ACCEPT_HTML};
///
/// let headers = build_browser_headers("Mozilla/5.0", ACCEPT_HTML);
/// assert!(headers.contains_key("user-agent"));
/// ```
pub fn build_browser_headers(user_agent: &str, accept: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    headers
}

/// Attach the jar as a `cookie` header; an empty jar adds nothing
pub fn with_cookie_header(mut headers: HeaderMap, jar: &CookieJar) -> HeaderMap {
    if let Some(value) = jar.header_value().and_then(|v| HeaderValue::from_str(&v).ok()) {
        headers.insert(COOKIE, value);
    }
    headers
}

/// Headers for a JSON request body
pub fn json_body_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}
