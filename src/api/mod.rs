//! Content API access.
//!
//! - [`client`] - HTTP client for the posts collection (pagination headers,
//!   size limits, slug lookup)
//! - [`types`] - Serde models for the JSON payload

mod client;
mod types;

pub use client::{ContentClient, FetchError, TOTAL_PAGES_HEADER, TOTAL_POSTS_HEADER};
pub use types::{Embedded, FeaturedMedia, PostPage, RemotePost, Rendered, Term};
