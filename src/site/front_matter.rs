use std::fmt::Write;

use crate::goodreads::ReadEntry;

/// Default `layout` value; the site's template for a single book.
pub const DEFAULT_LAYOUT: &str = "book";

const DELIMITER: &str = "---\n";

/// Renders the page for one entry.
///
/// The front-matter keys are always emitted in the same order:
/// `rating`, `title`, `link`, `has_content`, `layout`. The title is quoted
/// but otherwise written exactly as received. The trimmed review follows
/// the closing delimiter with no trailing newline.
pub fn render(entry: &ReadEntry, layout: &str) -> String {
    let content = entry.trimmed_review();
    let mut page = String::with_capacity(128 + entry.title.len() + content.len());

    page.push_str(DELIMITER);
    write_key(&mut page, "rating", entry.rating);
    write_key(&mut page, "title", format_args!("\"{}\"", entry.title));
    write_key(&mut page, "link", &entry.link);
    write_key(&mut page, "has_content", !content.is_empty());
    write_key(&mut page, "layout", layout);
    page.push_str(DELIMITER);
    page.push_str(content);
    page
}

fn write_key(page: &mut String, key: &str, value: impl std::fmt::Display) {
    // Writing into a String cannot fail
    let _ = writeln!(page, "{}: {}", key, value);
}
