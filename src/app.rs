use crate::api::{ContentClient, FetchError, PostPage};
use crate::config::Config;
use crate::feed::{
    CategoryFilter, DetailState, DisplayItem, FeedState, FilterBar, LoadOutcome, PageTicket,
};
use crate::keybindings::KeybindingRegistry;
use crate::theme::{StyleMap, ThemeVariant};
use ratatui::style::Style;
use std::borrow::Cow;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Maximum scroll offset for the detail view (ratatui u16 limit).
pub const MAX_SCROLL: usize = u16::MAX as usize;

/// How long a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// View Enum
// ============================================================================

/// Current view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Paginated post list with the category tab bar
    List,
    /// Single post opened from the list
    Detail,
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A page fetch finished. The ticket decides whether it is still wanted.
    PageLoaded {
        ticket: PageTicket,
        result: Result<PostPage, FetchError>,
    },
    /// A slug lookup finished.
    ///
    /// Fields:
    /// - `generation`: `detail_generation` when the lookup was spawned
    /// - `slug`: the slug that was requested
    /// - `state`: `Loaded`, `NotFound` or `Failed`
    DetailLoaded {
        generation: u64,
        slug: String,
        state: DetailState,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "page_load")
    /// - `ticket`: The page the task was loading, if it was a page load
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked {
        task: &'static str,
        ticket: Option<PageTicket>,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub client: ContentClient,
    pub per_page: u32,
    /// Rows from the end of the visible list at which the next page is requested.
    pub load_more_threshold: usize,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // Data
    /// Accumulated list for the current mount cycle.
    pub feed: FeedState,
    /// Category tabs; the active one is `feed.active_filter()`.
    pub filters: FilterBar,

    // UI State
    pub view: View,
    /// Index into the visible (filtered) items.
    pub selected: usize,
    /// Posts that fit in the list viewport, updated on render.
    pub list_visible_items: usize,

    // Detail
    pub detail: DetailState,
    /// Incremented on every detail open so late results for a previous post
    /// are dropped.
    pub detail_generation: u64,
    pub scroll_offset: usize,
    /// Wrapped line count of the detail body, updated on render.
    pub detail_content_lines: usize,
    /// Detail viewport height (excluding borders), updated on render.
    pub detail_visible_lines: usize,

    /// Status message with expiry
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,

    pub show_help: bool,
    pub help_scroll_offset: usize,

    /// Handle of the page fetch in flight, aborted on remount and drop.
    pub page_load_handle: Option<JoinHandle<()>>,
    /// Handle of the detail lookup in flight, aborted on exit and drop.
    pub detail_load_handle: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(client: ContentClient, config: &Config) -> Self {
        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!("{}", warning);
        }

        Self {
            client,
            per_page: config.per_page,
            load_more_threshold: config.load_more_threshold,
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings,
            feed: FeedState::new(config.item_mapper()),
            filters: config.filter_bar(),
            view: View::List,
            selected: 0,
            list_visible_items: 0,
            detail: DetailState::Idle,
            detail_generation: 0,
            scroll_offset: 0,
            detail_content_lines: 0,
            detail_visible_lines: 0,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            show_help: false,
            help_scroll_offset: 0,
            page_load_handle: None,
            detail_load_handle: None,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant. Returns its name for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ------------------------------------------------------------------------
    // List
    // ------------------------------------------------------------------------

    pub fn visible_items(&self) -> Vec<&DisplayItem> {
        self.feed.visible_items()
    }

    pub fn selected_item(&self) -> Option<&DisplayItem> {
        self.feed.visible_items().get(self.selected).copied()
    }

    /// Keep the selection inside the visible list.
    pub fn clamp_selection(&mut self) {
        let len = self.feed.visible_len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        let len = self.feed.visible_len();
        if len > 0 {
            self.selected = self.selected.saturating_add(1).min(len - 1);
        }
    }

    pub fn page_up(&mut self) {
        self.selected = self.selected.saturating_sub(self.list_visible_items.max(1));
    }

    pub fn page_down(&mut self) {
        let len = self.feed.visible_len();
        if len > 0 {
            self.selected = self
                .selected
                .saturating_add(self.list_visible_items.max(1))
                .min(len - 1);
        }
    }

    pub fn jump_top(&mut self) {
        self.selected = 0;
    }

    pub fn jump_bottom(&mut self) {
        self.selected = self.feed.visible_len().saturating_sub(1);
    }

    /// Whether the end-of-list sentinel is on screen.
    ///
    /// True when the selection is within `load_more_threshold` rows of the
    /// last visible post, when every visible post fits in the viewport, or
    /// when the filtered list is empty.
    pub fn sentinel_in_view(&self) -> bool {
        let len = self.feed.visible_len();
        if len == 0 {
            return true;
        }
        if len <= self.list_visible_items {
            return true;
        }
        let remaining = len - 1 - self.selected.min(len - 1);
        remaining <= self.load_more_threshold
    }

    /// Whether a scroll-triggered load should be started now.
    pub fn wants_more(&self) -> bool {
        self.view == View::List && self.sentinel_in_view() && self.feed.should_load_more()
    }

    /// Switch the active filter. Selection returns to the top.
    pub fn set_filter(&mut self, filter: CategoryFilter) -> bool {
        self.filters.ensure(&filter);
        if self.feed.set_filter(filter) {
            self.selected = 0;
            true
        } else {
            false
        }
    }

    pub fn next_filter(&mut self) -> bool {
        let next = self.filters.next(self.feed.active_filter());
        self.set_filter(next)
    }

    pub fn previous_filter(&mut self) -> bool {
        let prev = self.filters.previous(self.feed.active_filter());
        self.set_filter(prev)
    }

    /// Start a new mount cycle of the list.
    ///
    /// Any page fetch in flight is aborted; its result would be stale anyway.
    pub fn remount(&mut self) {
        if let Some(handle) = self.page_load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted page load task on remount");
        }
        self.feed.remount();
        self.selected = 0;
    }

    /// Apply a finished page fetch.
    pub fn apply_page(
        &mut self,
        ticket: PageTicket,
        result: Result<PostPage, FetchError>,
    ) -> LoadOutcome {
        let outcome = self.feed.complete_load(ticket, result);
        match &outcome {
            LoadOutcome::Applied { .. } => {
                self.page_load_handle = None;
                self.filters.observe(self.feed.items());
                self.clamp_selection();
            }
            LoadOutcome::Failed(error) => {
                self.page_load_handle = None;
                self.set_status(format!("Failed to load posts: {}", error));
            }
            LoadOutcome::Stale | LoadOutcome::Rejected(_) => {}
        }
        outcome
    }

    // ------------------------------------------------------------------------
    // Detail
    // ------------------------------------------------------------------------

    /// Open the detail view for the selected post.
    ///
    /// Returns the `(generation, slug)` to load, or `None` when nothing is
    /// selected.
    pub fn enter_detail(&mut self) -> Option<(u64, String)> {
        let slug = self.selected_item()?.slug().to_string();
        Some(self.open_detail(slug))
    }

    /// Open the detail view for an arbitrary slug.
    pub fn open_detail(&mut self, slug: String) -> (u64, String) {
        if let Some(handle) = self.detail_load_handle.take() {
            handle.abort();
        }
        self.detail_generation = self.detail_generation.wrapping_add(1);
        self.view = View::Detail;
        self.scroll_offset = 0;
        self.detail_content_lines = 0;
        self.detail = DetailState::Loading { slug: slug.clone() };
        (self.detail_generation, slug)
    }

    /// Apply a finished slug lookup. Late results for an earlier open are dropped.
    pub fn apply_detail(&mut self, generation: u64, slug: &str, state: DetailState) -> bool {
        if generation != self.detail_generation || self.view != View::Detail {
            tracing::debug!(
                expected = self.detail_generation,
                got = generation,
                slug,
                "Ignoring stale detail load"
            );
            return false;
        }
        self.detail_load_handle = None;
        self.detail = state;
        self.scroll_offset = 0;
        true
    }

    /// Back to the list.
    pub fn exit_detail(&mut self) {
        if let Some(handle) = self.detail_load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted detail load task on exit");
        }
        self.view = View::List;
        self.detail = DetailState::Idle;
        self.scroll_offset = 0;
        self.detail_content_lines = 0;
    }

    /// Public link of whatever is on screen: the open post or the selected row.
    pub fn current_link(&self) -> Option<&str> {
        match self.view {
            View::Detail => match &self.detail {
                DetailState::Loaded(detail) => detail.link.as_deref(),
                _ => None,
            },
            View::List => self.selected_item().and_then(|item| item.link.as_deref()),
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
        self.clamp_detail_scroll();
    }

    /// Clamp scroll offset to the last measured content and viewport size.
    pub fn clamp_detail_scroll(&mut self) {
        let max_scroll = self
            .detail_content_lines
            .saturating_sub(self.detail_visible_lines);
        self.scroll_offset = self.scroll_offset.min(max_scroll).min(MAX_SCROLL);
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (expires after a few seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Whether anything is loading that the spinner should animate for.
    pub fn is_busy(&self) -> bool {
        self.feed.is_loading() || self.detail.is_loading()
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort all in-flight tasks when the app goes away (view unmount).
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.page_load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted page load task on App drop");
        }
        if let Some(handle) = self.detail_load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted detail load task on App drop");
        }
    }
}
