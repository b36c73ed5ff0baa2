//! Utility functions for common operations.
//!
//! - **Text processing**: deterministic filename stems from book titles
//! - **URL validation**: scheme and transport checks for the service base URL

mod text;
mod url_validator;

pub use text::sanitize_title;
pub use url_validator::{validate_base_url, UrlValidationError};
