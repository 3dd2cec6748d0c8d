//! Shared helpers for turning remote content into safe terminal text.
//!
//! - **HTML**: strip markup, decode entities and split bodies into blocks
//! - **Text**: Unicode-aware width calculation and truncation
//! - **URL validation**: reject non-HTTP schemes and internal hosts
//!
//! # Examples
//!
//! ```
//! use crfnews::util::{display_width, html_to_plain, truncate_to_width};
//!
//! let title = html_to_plain("Posse &#8211; <em>CRF</em>");
//! assert_eq!(title, "Posse – CRF");
//! assert_eq!(display_width(&title), 11);
//! assert_eq!(truncate_to_width(&title, 8), "Posse...");
//! ```

mod html;
mod text;
mod url_validator;

pub use html::{
    collapse_whitespace, decode_entities, html_to_blocks, html_to_plain, strip_markup, BlockKind,
    TextBlock,
};
pub use text::{display_width, strip_control_chars, truncate_chars, truncate_to_width, ELLIPSIS};
pub use url_validator::{validate_url, validate_url_for_open, UrlValidationError};
