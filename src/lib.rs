//! Export a Goodreads "read" shelf as static-site pages.
//!
//! The pipeline is a straight line: [`goodreads::fetch_shelf`] pulls the
//! shelf document, [`goodreads::parse_shelf`] decodes it into
//! [`goodreads::ReadEntry`] values, and [`site::write_entries`] renders one
//! front-matter page per dated entry. [`sync::run`] chains the three.

pub mod config;
pub mod goodreads;
pub mod site;
pub mod sync;
pub mod util;
