use std::path::{Path, PathBuf};
use thiserror::Error;

use super::front_matter;
use crate::goodreads::{DateError, DatePolicy, ReadEntry};
use crate::util::sanitize_title;

/// Calendar-date prefix of every generated filename.
const FILENAME_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that abort a write pass.
///
/// Entries written before the failure are left in place.
#[derive(Debug, Error)]
pub enum WriteError {
    /// An entry has a date string that does not match its endpoint's layout.
    #[error("Cannot date '{title}': {source}")]
    Date {
        title: String,
        #[source]
        source: DateError,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-run settings for the writer.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub output_dir: PathBuf,
    pub layout: String,
    pub date_policy: DatePolicy,
}

/// Outcome of a successful write pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Paths written, in entry order.
    pub written: Vec<PathBuf>,
    /// Entries without a usable date.
    pub skipped: usize,
}

/// True when the entry carries no date the policy accepts.
pub fn should_skip(entry: &ReadEntry, policy: DatePolicy) -> bool {
    entry.date_signal(policy).is_none()
}

/// Derives `{YYYY-MM-DD}-{sanitized title}.md` for an entry.
pub fn filename(entry: &ReadEntry, policy: DatePolicy) -> Result<String, DateError> {
    let date = entry.effective_date(policy)?;
    Ok(format!(
        "{}-{}.md",
        date.format(FILENAME_DATE_FORMAT),
        sanitize_title(&entry.title)
    ))
}

/// Renders and writes one entry, overwriting any existing file.
pub async fn write_entry(entry: &ReadEntry, options: &WriteOptions) -> Result<PathBuf, WriteError> {
    let name = filename(entry, options.date_policy).map_err(|source| WriteError::Date {
        title: entry.title.clone(),
        source,
    })?;
    let page = front_matter::render(entry, &options.layout);

    let path = options.output_dir.join(name);
    tracing::info!(path = %path.display(), "Writing review");
    tokio::fs::write(&path, page)
        .await
        .map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Writes every eligible entry in order.
///
/// Undated entries are skipped and logged. The first date or filesystem
/// error stops the pass; later entries are not attempted.
pub async fn write_entries(
    entries: &[ReadEntry],
    options: &WriteOptions,
) -> Result<WriteReport, WriteError> {
    let mut report = WriteReport::default();

    for entry in entries {
        if should_skip(entry, options.date_policy) {
            tracing::info!(title = %entry.title, "Skipping entry as it has no read date");
            report.skipped += 1;
            continue;
        }
        let path = write_entry(entry, options).await?;
        report.written.push(path);
    }

    Ok(report)
}

/// Directory check used before a run starts writing.
pub async fn ensure_output_dir(dir: &Path) -> Result<(), WriteError> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(WriteError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::other("not a directory"),
        }),
        Err(source) => Err(WriteError::Io {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goodreads::SourceKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn rss_entry(title: &str, read_at: &str, added_at: &str) -> ReadEntry {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        ReadEntry {
            title: title.to_string(),
            link: format!("https://x/{}", title.len()),
            rating: 3,
            read_at: opt(read_at),
            added_at: opt(added_at),
            review: String::new(),
            source: SourceKind::Rss,
        }
    }

    fn options(dir: &Path, policy: DatePolicy) -> WriteOptions {
        WriteOptions {
            output_dir: dir.to_path_buf(),
            layout: "book".to_string(),
            date_policy: policy,
        }
    }

    const READ: &str = "Mon, 2 Jan 2006 15:04:05 -0700";
    const ADDED: &str = "Sun, 1 Jan 2006 09:00:00 -0700";

    #[test]
    fn test_filename_from_read_date() {
        let e = rss_entry("Dune", READ, "");
        assert_eq!(
            filename(&e, DatePolicy::ReadOrAdded).unwrap(),
            "2006-01-02-Dune.md"
        );
    }

    #[test]
    fn test_filename_sanitizes_title() {
        let e = rss_entry("Either/Or A Fragment", READ, "");
        assert_eq!(
            filename(&e, DatePolicy::ReadOrAdded).unwrap(),
            "2006-01-02-Either-Or-A-Fragment.md"
        );
    }

    #[test]
    fn test_filename_falls_back_to_added() {
        let e = rss_entry("Dune", "", ADDED);
        assert_eq!(
            filename(&e, DatePolicy::ReadOrAdded).unwrap(),
            "2006-01-01-Dune.md"
        );
    }

    #[test]
    fn test_filename_bad_date() {
        let e = rss_entry("Bad Date", "not-a-date", "");
        assert!(matches!(
            filename(&e, DatePolicy::ReadOrAdded),
            Err(DateError::Format { .. })
        ));
    }

    #[test]
    fn test_should_skip_by_policy() {
        let undated = rss_entry("No Date Book", "", "");
        assert!(should_skip(&undated, DatePolicy::ReadOrAdded));
        assert!(should_skip(&undated, DatePolicy::ReadOnly));

        let added_only = rss_entry("Shelved", "", ADDED);
        assert!(!should_skip(&added_only, DatePolicy::ReadOrAdded));
        assert!(should_skip(&added_only, DatePolicy::ReadOnly));

        // A malformed date is still a date signal: it must fail, not skip
        let malformed = rss_entry("Bad Date", "not-a-date", "");
        assert!(!should_skip(&malformed, DatePolicy::ReadOrAdded));
    }

    #[tokio::test]
    async fn test_write_entries_writes_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![
            rss_entry("Dune", READ, ""),
            rss_entry("No Date Book", "", ""),
            rss_entry("Shelved Only", "", ADDED),
        ];

        let report = write_entries(&entries, &options(dir.path(), DatePolicy::ReadOrAdded))
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(
            report.written,
            vec![
                dir.path().join("2006-01-02-Dune.md"),
                dir.path().join("2006-01-01-Shelved-Only.md"),
            ]
        );
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_read_only_policy_skips_added_only() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![rss_entry("Shelved Only", "", ADDED)];

        let report = write_entries(&entries, &options(dir.path(), DatePolicy::ReadOnly))
            .await
            .unwrap();

        assert!(report.written.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_bad_date_stops_remaining_writes() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![
            rss_entry("First", READ, ""),
            rss_entry("Bad Date", "not-a-date", ""),
            rss_entry("After", READ, ""),
        ];

        let err = write_entries(&entries, &options(dir.path(), DatePolicy::ReadOrAdded))
            .await
            .unwrap_err();

        match err {
            WriteError::Date { title, .. } => assert_eq!(title, "Bad Date"),
            e => panic!("Expected Date error, got {:?}", e),
        }
        assert!(dir.path().join("2006-01-02-First.md").exists());
        assert!(!dir.path().join("2006-01-02-After.md").exists());
    }

    #[tokio::test]
    async fn test_existing_file_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("2006-01-02-Dune.md");
        std::fs::write(&target, "stale content that is much longer than the new page").unwrap();

        let mut e = rss_entry("Dune", READ, "");
        e.review = "fresh".to_string();
        write_entry(&e, &options(dir.path(), DatePolicy::ReadOrAdded))
            .await
            .unwrap();

        let written = std::fs::read_to_string(&target).unwrap();
        assert!(written.ends_with("---\nfresh"));
        assert!(!written.contains("stale"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = write_entry(
            &rss_entry("Dune", READ, ""),
            &options(&missing, DatePolicy::ReadOrAdded),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WriteError::Io { .. }));
    }

    #[tokio::test]
    async fn test_ensure_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_output_dir(dir.path()).await.is_ok());
        assert!(ensure_output_dir(&dir.path().join("missing")).await.is_err());

        let file = dir.path().join("file.md");
        std::fs::write(&file, "x").unwrap();
        assert!(ensure_output_dir(&file).await.is_err());
    }

    proptest! {
        #[test]
        fn prop_filename_shape(title in "[A-Za-z0-9 /]{1,40}") {
            let e = rss_entry(&title, READ, "");
            let name = filename(&e, DatePolicy::ReadOrAdded).unwrap();
            prop_assert!(name.starts_with("2006-01-02-"));
            prop_assert!(name.ends_with(".md"));
            prop_assert!(!name.contains(' '));
            prop_assert!(!name.contains('/'));
            let stem = &name["2006-01-02-".len()..name.len() - ".md".len()];
            prop_assert_eq!(stem, title.replace([' ', '/'], "-"));
        }
    }
}
