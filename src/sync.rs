//! The export pipeline: fetch the shelf, decode it, write the pages.
//!
//! Each stage runs once, in order, on the caller's task. The first error
//! from any stage ends the run and is returned unchanged inside
//! [`SyncError`]; mapping it to an exit status is left to the binary.

use std::time::Duration;
use thiserror::Error;

use crate::goodreads::{self, FetchError, ParseError, ShelfRequest};
use crate::site::{self, WriteError, WriteOptions, WriteReport};

/// Fully resolved settings for one export run.
#[derive(Debug)]
pub struct SyncConfig {
    pub shelf: ShelfRequest,
    pub write: WriteOptions,
    /// `None` leaves the HTTP client's defaults in place.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Runs the export with a client built from `config`.
pub async fn run(config: &SyncConfig) -> Result<WriteReport, SyncError> {
    let client = goodreads::build_client(config.request_timeout)?;
    run_with_client(&client, config).await
}

/// Runs the export using an existing HTTP client.
///
/// Fails on a missing output directory before any request is sent.
pub async fn run_with_client(
    client: &reqwest::Client,
    config: &SyncConfig,
) -> Result<WriteReport, SyncError> {
    site::ensure_output_dir(&config.write.output_dir).await?;

    let body = goodreads::fetch_shelf(client, &config.shelf).await?;
    let entries = goodreads::parse_shelf(&body, config.shelf.source)?;
    tracing::debug!(entries = entries.len(), "Parsed read shelf");

    let report = site::write_entries(&entries, &config.write).await?;
    tracing::info!(
        written = report.written.len(),
        skipped = report.skipped,
        output_dir = %config.write.output_dir.display(),
        "Export complete"
    );
    Ok(report)
}
