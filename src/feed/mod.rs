//! Post list and detail loading.
//!
//! - [`item`] - Normalizes API posts into display items
//! - [`filter`] - Category filter and the ordered tab bar
//! - [`loader`] - Paginated list state with generation-checked page tickets
//! - [`detail`] - Single post lookup by slug

mod detail;
mod filter;
mod item;
mod loader;

pub use detail::{load_detail, DetailState, PostDetail};
pub use filter::{CategoryFilter, FilterBar, ALL_LABEL, DEFAULT_CATEGORY_PRESETS};
pub use item::{
    detail_url, format_date_pt_br, DisplayItem, ItemMapper, DEFAULT_EXCERPT_MAX_CHARS,
    DEFAULT_FALLBACK_CATEGORY, DEFAULT_PLACEHOLDER_IMAGE, DETAIL_ROUTE_PREFIX,
};
pub use loader::{
    fetch_ticket, FeedLoader, FeedState, LoadOutcome, LoadPhase, LoadRejected, PageTicket,
};
