use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::entry::SourceKind;

const MAX_SHELF_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Page size requested from the keyed API. Only the first page is fetched.
pub const API_PAGE_SIZE: u32 = 200;

/// Errors that can occur while fetching a shelf.
///
/// None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Any response other than 200 OK
    #[error("Non 200 status code: {0}")]
    HttpStatus(u16),
    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The configured base URL cannot carry path segments
    #[error("Base URL cannot be used for shelf requests: {0}")]
    InvalidBaseUrl(String),
    /// The keyed API was selected without an API key
    #[error("The keyed API requires an API key")]
    MissingApiKey,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Everything needed to address one user's read shelf.
#[derive(Debug)]
pub struct ShelfRequest {
    pub base_url: Url,
    pub user_id: u64,
    pub source: SourceKind,
    /// Only consulted for [`SourceKind::Api`].
    pub api_key: Option<SecretString>,
}

impl ShelfRequest {
    /// Builds the request URL for the configured endpoint.
    ///
    /// - RSS: `{base}/review/list_rss/{user}?shelf=read`
    /// - API: `{base}/review/list/{user}.xml?key=..&shelf=read&v=2&per_page=200`
    pub fn url(&self) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            match self.source {
                SourceKind::Rss => {
                    let user = self.user_id.to_string();
                    segments.extend(["review", "list_rss", user.as_str()]);
                }
                SourceKind::Api => {
                    let document = format!("{}.xml", self.user_id);
                    segments.extend(["review", "list", document.as_str()]);
                }
            }
        }

        match self.source {
            SourceKind::Rss => {
                url.query_pairs_mut().append_pair("shelf", "read");
            }
            SourceKind::Api => {
                let key = self.api_key.as_ref().ok_or(FetchError::MissingApiKey)?;
                url.query_pairs_mut()
                    .append_pair("key", key.expose_secret())
                    .append_pair("shelf", "read")
                    .append_pair("v", "2")
                    .append_pair("per_page", &API_PAGE_SIZE.to_string());
            }
        }

        Ok(url)
    }
}

/// Renders a URL for logging with the `key` query value masked.
pub fn redacted(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "key") {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" {
                "[REDACTED]".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

/// Builds the HTTP client used for the shelf request.
///
/// `timeout` of `None` leaves reqwest's defaults in place.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(FetchError::ClientBuild)
}

/// Fetches the raw shelf document.
///
/// # Errors
///
/// - [`FetchError::MissingApiKey`] / [`FetchError::InvalidBaseUrl`] - request could not be built
/// - [`FetchError::Network`] - connection, DNS or TLS failure
/// - [`FetchError::HttpStatus`] - anything other than 200 OK
/// - [`FetchError::ResponseTooLarge`] - body exceeded 10MB
/// - [`FetchError::IncompleteResponse`] - body shorter than Content-Length
pub async fn fetch_shelf(
    client: &reqwest::Client,
    request: &ShelfRequest,
) -> Result<Vec<u8>, FetchError> {
    let url = request.url()?;
    tracing::info!(
        user_id = request.user_id,
        source = %request.source,
        url = %redacted(&url),
        "Getting read books from Goodreads"
    );

    let response = client.get(url).send().await?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_SHELF_SIZE).await?;
    tracing::debug!(bytes = bytes.len(), "Shelf downloaded");
    Ok(bytes)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
