//! Terminal User Interface module.
//!
//! This module provides the TUI for the news reader, including:
//! - Main event loop (`run`)
//! - Input handling for the list and detail views
//! - Rendering for the post list, post detail and overlays
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch
//! - `helpers` - Task spawning and shared utility functions
//! - `list` - Filter tabs and post list widget
//! - `detail` - Post detail widget
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod detail;
mod events;
mod help;
mod helpers;
mod input;
mod list;
mod loop_runner;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
