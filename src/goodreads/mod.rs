//! Goodreads read-shelf retrieval.
//!
//! Two endpoints expose the same shelf:
//!
//! - **RSS** (`review/list_rss/{user}`): public, dates as `Mon, 2 Jan 2006 15:04:05 -0700`
//! - **Keyed API** (`review/list/{user}.xml`): needs a developer key, dates as
//!   `Wed Mar 22 10:34:11 -0700 2017`
//!
//! Both decode into the same [`ReadEntry`], tagged with the [`SourceKind`]
//! that produced it, so everything downstream has a single code path.
//!
//! - [`fetcher`] - URL construction and the single GET
//! - [`parser`] - XML schemas for both endpoints
//! - [`entry`] - the canonical entry and lazy date resolution

mod entry;
mod fetcher;
mod parser;

pub use entry::{
    parse_timestamp, DateError, DatePolicy, ReadEntry, SourceKind, API_DATE_FORMAT,
    RSS_DATE_FORMAT,
};
pub use fetcher::{build_client, fetch_shelf, redacted, FetchError, ShelfRequest, API_PAGE_SIZE};
pub use parser::{parse_shelf, ParseError};
