//! Static-site output: one front-matter page per dated shelf entry.
//!
//! - [`front_matter`] - page rendering
//! - [`writer`] - skip rules, filenames, and persistence

mod front_matter;
mod writer;

pub use front_matter::{render, DEFAULT_LAYOUT};
pub use writer::{
    ensure_output_dir, filename, should_skip, write_entries, write_entry, WriteError,
    WriteOptions, WriteReport,
};
