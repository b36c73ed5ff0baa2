use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::entry::{ReadEntry, SourceKind};

/// Errors that can occur while decoding a shelf document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Shelf response is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The body is not well-formed XML or does not match the expected schema.
    #[error("Failed to deserialize {source_kind} shelf: {error}")]
    Xml {
        source_kind: SourceKind,
        #[source]
        error: quick_xml::errors::serialize::DeError,
    },
}

// ============================================================================
// RSS schema (review/list_rss)
// ============================================================================

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    user_date_added: String,
    #[serde(default)]
    user_read_at: String,
    #[serde(default)]
    user_review: String,
    #[serde(default, deserialize_with = "deserialize_rating")]
    user_rating: u32,
}

// ============================================================================
// Keyed API schema (review/list.xml?v=2)
// ============================================================================

#[derive(Debug, Deserialize)]
struct GoodreadsResponse {
    reviews: ApiReviews,
}

#[derive(Debug, Deserialize)]
struct ApiReviews {
    #[serde(rename = "review", default)]
    reviews: Vec<ApiReview>,
}

#[derive(Debug, Deserialize)]
struct ApiReview {
    book: ApiBook,
    #[serde(default, deserialize_with = "deserialize_rating")]
    rating: u32,
    #[serde(default)]
    read_at: String,
    #[serde(default)]
    date_added: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct ApiBook {
    #[serde(default)]
    title_without_series: String,
    #[serde(default)]
    link: String,
}

/// Ratings arrive as element text; an empty element means "not rated".
fn deserialize_rating<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| serde::de::Error::custom(format!("invalid rating '{}'", trimmed)))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Decodes a shelf response body into entries, in document order.
///
/// Dates are not validated here; see [`ReadEntry::effective_date`].
pub fn parse_shelf(bytes: &[u8], source: SourceKind) -> Result<Vec<ReadEntry>, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    let xml_err = |error| ParseError::Xml {
        source_kind: source,
        error,
    };

    let entries = match source {
        SourceKind::Rss => {
            let rss: Rss = quick_xml::de::from_str(text).map_err(xml_err)?;
            rss.channel
                .items
                .into_iter()
                .map(|item| ReadEntry {
                    title: item.title,
                    link: item.link,
                    rating: item.user_rating,
                    read_at: non_empty(item.user_read_at),
                    added_at: non_empty(item.user_date_added),
                    review: item.user_review,
                    source,
                })
                .collect()
        }
        SourceKind::Api => {
            let response: GoodreadsResponse = quick_xml::de::from_str(text).map_err(xml_err)?;
            response
                .reviews
                .reviews
                .into_iter()
                .map(|review| ReadEntry {
                    title: review.book.title_without_series,
                    link: review.book.link,
                    rating: review.rating,
                    read_at: non_empty(review.read_at),
                    added_at: non_empty(review.date_added),
                    review: review.body,
                    source,
                })
                .collect()
        }
    };

    Ok(entries)
}
