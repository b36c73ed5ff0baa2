use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur while validating the service base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP was requested somewhere other than localhost while a secret is attached.
    #[error("Insecure base URL: HTTPS required when sending an API key (except localhost)")]
    InsecureWithKey,
}

/// Validates the base URL shelf requests are issued against.
///
/// Only `http` and `https` are accepted. When `carries_secret` is set (the
/// keyed API puts the key in the query string), plain HTTP is rejected
/// unless the host is loopback, which keeps local mock servers usable.
///
/// # Examples
///
/// ```
/// use readshelf::util::validate_base_url;
///
/// assert!(validate_base_url("https://www.goodreads.com", true).is_ok());
/// assert!(validate_base_url("http://127.0.0.1:8080", true).is_ok());
/// assert!(validate_base_url("http://www.goodreads.com", true).is_err());
/// assert!(validate_base_url("http://www.goodreads.com", false).is_ok());
/// assert!(validate_base_url("file:///etc/passwd", false).is_err());
/// ```
pub fn validate_base_url(url_str: &str, carries_secret: bool) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => {}
        "http" => {
            if carries_secret && !is_loopback_host(&url) {
                return Err(UrlValidationError::InsecureWithKey);
            }
            if carries_secret {
                tracing::warn!(base_url = %url, "Using non-HTTPS base URL (localhost only)");
            }
        }
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    Ok(url)
}

fn is_loopback_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host == "localhost" {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
