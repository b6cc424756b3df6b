//! Image URL extraction from HTML markup.
//!
//! Two operations: [`is_valid_url`] gates page URLs before any network work,
//! and [`extract_image_urls`] turns a fetched page body into a deduplicated
//! sequence of absolute image URLs ready for download.

mod extract;
mod validate;

pub use extract::extract_image_urls;
pub use validate::is_valid_url;
