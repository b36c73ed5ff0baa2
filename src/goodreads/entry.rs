use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use thiserror::Error;

/// Timestamp layout used by the `list_rss` feed, e.g. `Mon, 2 Jan 2006 15:04:05 -0700`.
pub const RSS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Timestamp layout used by the keyed `review/list` API, e.g. `Wed Mar 22 10:34:11 -0700 2017`.
pub const API_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Which Goodreads endpoint a shelf is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Public `review/list_rss/{user}` feed. No key required.
    Rss,
    /// Keyed `review/list/{user}.xml` API.
    Api,
}

impl SourceKind {
    /// The literal timestamp layout this endpoint emits.
    pub fn date_format(self) -> &'static str {
        match self {
            SourceKind::Rss => RSS_DATE_FORMAT,
            SourceKind::Api => API_DATE_FORMAT,
        }
    }

    /// Date policy reproducing each endpoint's historical behaviour.
    pub fn default_date_policy(self) -> DatePolicy {
        match self {
            SourceKind::Rss => DatePolicy::ReadOrAdded,
            SourceKind::Api => DatePolicy::ReadOnly,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Rss => f.write_str("rss"),
            SourceKind::Api => f.write_str("api"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rss" => Ok(SourceKind::Rss),
            "api" => Ok(SourceKind::Api),
            other => Err(format!("unknown source '{}' (expected 'rss' or 'api')", other)),
        }
    }
}

/// Which timestamps make an entry eligible for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePolicy {
    /// Use `read_at`, falling back to `added_at` when the book has no read date.
    ReadOrAdded,
    /// Only entries with a `read_at` timestamp are eligible.
    ReadOnly,
}

impl std::str::FromStr for DatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read-or-added" => Ok(DatePolicy::ReadOrAdded),
            "read-only" => Ok(DatePolicy::ReadOnly),
            other => Err(format!(
                "unknown date policy '{}' (expected 'read-or-added' or 'read-only')",
                other
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum DateError {
    #[error("Invalid date '{value}' (expected layout '{format}'): {source}")]
    Format {
        value: String,
        format: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Entry has no usable date")]
    Missing,
}

/// One book from the read shelf, independent of which endpoint produced it.
///
/// Timestamps are kept as the raw strings the service sent. They are only
/// parsed when [`ReadEntry::effective_date`] is called, so one malformed date
/// never prevents its siblings from being decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEntry {
    pub title: String,
    pub link: String,
    /// 0 when the book was not rated.
    pub rating: u32,
    pub read_at: Option<String>,
    pub added_at: Option<String>,
    pub review: String,
    pub source: SourceKind,
}

impl ReadEntry {
    /// Raw timestamp the entry would be dated by under `policy`, if any.
    pub fn date_signal(&self, policy: DatePolicy) -> Option<&str> {
        match policy {
            DatePolicy::ReadOnly => self.read_at.as_deref(),
            DatePolicy::ReadOrAdded => self.read_at.as_deref().or(self.added_at.as_deref()),
        }
    }

    /// Resolves the calendar date this entry is filed under.
    ///
    /// The date is taken in the timestamp's own UTC offset, so
    /// `Sun, 1 Jan 2006 23:30:00 -0700` stays on January 1st.
    pub fn effective_date(&self, policy: DatePolicy) -> Result<NaiveDate, DateError> {
        let raw = self.date_signal(policy).ok_or(DateError::Missing)?;
        parse_timestamp(raw, self.source.date_format()).map(|dt| dt.date_naive())
    }

    /// Review text with surrounding whitespace removed.
    pub fn trimmed_review(&self) -> &str {
        self.review.trim()
    }
}

pub fn parse_timestamp(value: &str, format: &'static str) -> Result<DateTime<FixedOffset>, DateError> {
    DateTime::parse_from_str(value, format).map_err(|source| DateError::Format {
        value: value.to_string(),
        format,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: SourceKind, read_at: Option<&str>, added_at: Option<&str>) -> ReadEntry {
        ReadEntry {
            title: "Dune".to_string(),
            link: "https://example.com/book/1".to_string(),
            rating: 5,
            read_at: read_at.map(str::to_string),
            added_at: added_at.map(str::to_string),
            review: String::new(),
            source,
        }
    }

    #[test]
    fn test_rss_date_parses() {
        let e = entry(SourceKind::Rss, Some("Mon, 2 Jan 2006 15:04:05 -0700"), None);
        let date = e.effective_date(DatePolicy::ReadOrAdded).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2006, 1, 2).unwrap());
    }

    #[test]
    fn test_rss_date_two_digit_day() {
        let e = entry(SourceKind::Rss, Some("Fri, 15 Mar 2019 00:00:00 -0700"), None);
        let date = e.effective_date(DatePolicy::ReadOrAdded).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 3, 15).unwrap());
    }

    #[test]
    fn test_api_date_parses() {
        let e = entry(SourceKind::Api, Some("Wed Mar 22 10:34:11 -0700 2017"), None);
        let date = e.effective_date(DatePolicy::ReadOnly).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2017, 3, 22).unwrap());
    }

    #[test]
    fn test_date_kept_in_source_offset() {
        // 23:30 at -0700 is already the next day in UTC
        let e = entry(SourceKind::Rss, Some("Sun, 1 Jan 2006 23:30:00 -0700"), None);
        let date = e.effective_date(DatePolicy::ReadOrAdded).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2006, 1, 1).unwrap());
    }

    #[test]
    fn test_added_fallback_under_read_or_added() {
        let e = entry(SourceKind::Rss, None, Some("Tue, 3 Jan 2006 08:00:00 +0000"));
        let date = e.effective_date(DatePolicy::ReadOrAdded).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2006, 1, 3).unwrap());
    }

    #[test]
    fn test_read_at_preferred_over_added() {
        let e = entry(
            SourceKind::Rss,
            Some("Mon, 2 Jan 2006 15:04:05 -0700"),
            Some("Sat, 1 Jan 2000 00:00:00 +0000"),
        );
        let date = e.effective_date(DatePolicy::ReadOrAdded).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2006, 1, 2).unwrap());
    }

    #[test]
    fn test_read_only_ignores_added() {
        let e = entry(SourceKind::Api, None, Some("Wed Mar 22 10:34:11 -0700 2017"));
        assert!(e.date_signal(DatePolicy::ReadOnly).is_none());
        assert!(matches!(
            e.effective_date(DatePolicy::ReadOnly),
            Err(DateError::Missing)
        ));
    }

    #[test]
    fn test_malformed_date_is_format_error() {
        let e = entry(SourceKind::Rss, Some("not-a-date"), None);
        let err = e.effective_date(DatePolicy::ReadOrAdded).unwrap_err();
        assert!(matches!(err, DateError::Format { .. }));
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_weekday_must_match_date() {
        // 2 Jan 2006 was a Monday
        let e = entry(SourceKind::Rss, Some("Tue, 2 Jan 2006 15:04:05 -0700"), None);
        assert!(matches!(
            e.effective_date(DatePolicy::ReadOrAdded),
            Err(DateError::Format { .. })
        ));
    }

    #[test]
    fn test_api_layout_rejected_for_rss_entry() {
        let e = entry(SourceKind::Rss, Some("Wed Mar 22 10:34:11 -0700 2017"), None);
        assert!(e.effective_date(DatePolicy::ReadOrAdded).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("RSS".parse::<SourceKind>(), Ok(SourceKind::Rss));
        assert_eq!("api".parse::<SourceKind>(), Ok(SourceKind::Api));
        assert!("atom".parse::<SourceKind>().is_err());
        assert_eq!("read-only".parse::<DatePolicy>(), Ok(DatePolicy::ReadOnly));
        assert_eq!(
            "read-or-added".parse::<DatePolicy>(),
            Ok(DatePolicy::ReadOrAdded)
        );
        assert!("never".parse::<DatePolicy>().is_err());
    }

    #[test]
    fn test_default_policies() {
        assert_eq!(SourceKind::Rss.default_date_policy(), DatePolicy::ReadOrAdded);
        assert_eq!(SourceKind::Api.default_date_policy(), DatePolicy::ReadOnly);
    }
}
