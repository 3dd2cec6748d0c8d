//! Terminal reader for the CRF-AL news and publications feed.
//!
//! The crate is split the same way the binary uses it:
//!
//! - [`api`] - HTTP client and JSON models for the content API
//! - [`feed`] - item mapping, category filters, paginated loading, detail lookup
//! - [`app`] - TUI application state
//! - [`ui`] - event loop, input handling and rendering
//! - [`config`], [`theme`], [`keybindings`] - user settings
//! - [`util`] - text, HTML and URL helpers

pub mod api;
pub mod app;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod theme;
pub mod ui;
pub mod util;
