//! Paginated loading state for the post list.
//!
//! [`FeedState`] is a synchronous state machine: [`FeedState::begin_load`]
//! issues a [`PageTicket`] and [`FeedState::complete_load`] applies the fetch
//! result that comes back for it. The UI runs the fetch on a background task in
//! between; [`FeedLoader`] does all three steps inline for the CLI.

use thiserror::Error;

use super::filter::CategoryFilter;
use super::item::{DisplayItem, ItemMapper};
use crate::api::{ContentClient, FetchError, PostPage};

/// Which kind of fetch is in flight, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    /// Page 1 of a mount cycle.
    Initial,
    /// Any later page.
    More,
}

/// Handle for one issued page fetch.
///
/// Only the ticket currently in flight for the current generation is accepted
/// by [`FeedState::complete_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    page: u32,
}

impl PageTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadRejected {
    #[error("page numbers start at 1")]
    InvalidPage,
    #[error("page {in_flight} is still loading")]
    InFlight { in_flight: u32 },
    #[error("page {page} is past the last page ({total_pages})")]
    BeyondLastPage { page: u32, total_pages: u32 },
    #[error("page {page} was already loaded")]
    AlreadyLoaded { page: u32 },
}

/// What happened to a page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Items were replaced (page 1) or appended.
    Applied { page: u32, added: usize },
    /// The fetch failed; the list is unchanged.
    Failed(String),
    /// The result belonged to an earlier mount cycle and was dropped.
    Stale,
    /// The load was never started.
    Rejected(LoadRejected),
}

/// Accumulated list state for one mount of the list view.
#[derive(Debug, Clone)]
pub struct FeedState {
    mapper: ItemMapper,
    items: Vec<DisplayItem>,
    current_page: u32,
    total_pages: u32,
    total_posts: Option<u64>,
    active_filter: CategoryFilter,
    phase: LoadPhase,
    in_flight: Option<PageTicket>,
    generation: u64,
    last_error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(ItemMapper::default())
    }
}

impl FeedState {
    pub fn new(mapper: ItemMapper) -> Self {
        Self {
            mapper,
            items: Vec::new(),
            current_page: 0,
            total_pages: 1,
            total_posts: None,
            active_filter: CategoryFilter::All,
            phase: LoadPhase::Idle,
            in_flight: None,
            generation: 0,
            last_error: None,
        }
    }

    pub fn mapper(&self) -> &ItemMapper {
        &self.mapper
    }

    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_posts(&self) -> Option<u64> {
        self.total_posts
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading_initial(&self) -> bool {
        self.phase == LoadPhase::Initial
    }

    pub fn is_loading_more(&self) -> bool {
        self.phase == LoadPhase::More
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn active_filter(&self) -> &CategoryFilter {
        &self.active_filter
    }

    /// Change the active filter. Returns whether it changed.
    pub fn set_filter(&mut self, filter: CategoryFilter) -> bool {
        if self.active_filter == filter {
            return false;
        }
        tracing::debug!(filter = filter.label(), "Filter changed");
        self.active_filter = filter;
        true
    }

    /// Items matching the active filter, in load order.
    pub fn visible_items(&self) -> Vec<&DisplayItem> {
        self.items
            .iter()
            .filter(|item| self.active_filter.matches(item))
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        self.items
            .iter()
            .filter(|item| self.active_filter.matches(item))
            .count()
    }

    pub fn should_load_more(&self) -> bool {
        self.current_page < self.total_pages && self.in_flight.is_none()
    }

    /// Every page has been loaded and at least one item exists.
    pub fn is_end_of_list(&self) -> bool {
        !self.items.is_empty() && self.current_page >= self.total_pages && !self.is_loading()
    }

    /// Start a new mount cycle.
    ///
    /// Items and pagination reset, the active filter is kept and any result
    /// still in flight for the previous cycle will be reported as stale.
    pub fn remount(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.current_page = 0;
        self.total_pages = 1;
        self.total_posts = None;
        self.phase = LoadPhase::Idle;
        self.in_flight = None;
        self.last_error = None;
        tracing::debug!(generation = self.generation, "Feed remounted");
    }

    pub fn begin_load(&mut self, page: u32) -> Result<PageTicket, LoadRejected> {
        if page == 0 {
            return Err(LoadRejected::InvalidPage);
        }
        if let Some(ticket) = self.in_flight {
            return Err(LoadRejected::InFlight {
                in_flight: ticket.page,
            });
        }
        if page > self.total_pages {
            return Err(LoadRejected::BeyondLastPage {
                page,
                total_pages: self.total_pages,
            });
        }
        if page > 1 && page <= self.current_page {
            return Err(LoadRejected::AlreadyLoaded { page });
        }

        let ticket = PageTicket {
            generation: self.generation,
            page,
        };
        self.in_flight = Some(ticket);
        self.phase = if page == 1 {
            LoadPhase::Initial
        } else {
            LoadPhase::More
        };
        tracing::debug!(page, generation = self.generation, "Page load started");
        Ok(ticket)
    }

    pub fn complete_load(
        &mut self,
        ticket: PageTicket,
        result: Result<PostPage, FetchError>,
    ) -> LoadOutcome {
        if self.in_flight != Some(ticket) {
            tracing::debug!(
                page = ticket.page,
                ticket_generation = ticket.generation,
                generation = self.generation,
                "Discarding stale page result"
            );
            return LoadOutcome::Stale;
        }
        self.in_flight = None;
        self.phase = LoadPhase::Idle;

        match result {
            Ok(page) => {
                if let Some(total) = page.total_pages {
                    self.total_pages = total.max(1);
                }
                if page.total_posts.is_some() {
                    self.total_posts = page.total_posts;
                }

                let mapped = self.mapper.map_all(&page.posts);
                let added = mapped.len();
                if ticket.page == 1 {
                    self.items = mapped;
                } else {
                    self.items.extend(mapped);
                }
                self.current_page = ticket.page;
                self.total_pages = self.total_pages.max(self.current_page);
                self.last_error = None;

                tracing::debug!(
                    page = ticket.page,
                    added,
                    total_pages = self.total_pages,
                    "Page applied"
                );
                LoadOutcome::Applied {
                    page: ticket.page,
                    added,
                }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(page = ticket.page, error = %message, "Page load failed");
                self.last_error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Give up on an in-flight load whose task died without a result.
    ///
    /// Behaves like a failed fetch for the matching ticket and like a stale
    /// result for any other.
    pub fn abandon_load(&mut self, ticket: PageTicket, reason: impl Into<String>) -> LoadOutcome {
        if self.in_flight != Some(ticket) {
            return LoadOutcome::Stale;
        }
        self.in_flight = None;
        self.phase = LoadPhase::Idle;
        let message = reason.into();
        tracing::warn!(page = ticket.page, error = %message, "Page load abandoned");
        self.last_error = Some(message.clone());
        LoadOutcome::Failed(message)
    }
}

/// Fetch the page a ticket was issued for.
pub async fn fetch_ticket(
    client: &ContentClient,
    ticket: PageTicket,
    per_page: u32,
) -> Result<PostPage, FetchError> {
    client.fetch_page(ticket.page, per_page).await
}

/// [`FeedState`] bundled with a client, loading pages inline.
#[derive(Debug, Clone)]
pub struct FeedLoader {
    client: ContentClient,
    per_page: u32,
    state: FeedState,
}

impl FeedLoader {
    pub fn new(client: ContentClient, per_page: u32, mapper: ItemMapper) -> Self {
        Self {
            client,
            per_page: per_page.max(1),
            state: FeedState::new(mapper),
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub async fn load_page(&mut self, page: u32) -> LoadOutcome {
        let ticket = match self.state.begin_load(page) {
            Ok(ticket) => ticket,
            Err(rejected) => {
                tracing::debug!(page, reason = %rejected, "Page load rejected");
                return LoadOutcome::Rejected(rejected);
            }
        };
        let result = fetch_ticket(&self.client, ticket, self.per_page).await;
        self.state.complete_load(ticket, result)
    }

    /// Load the next page if [`FeedState::should_load_more`] allows it.
    pub async fn load_more(&mut self) -> LoadOutcome {
        let next = self.state.current_page().saturating_add(1);
        self.load_page(next).await
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) -> bool {
        self.state.set_filter(filter)
    }

    pub fn should_load_more(&self) -> bool {
        self.state.should_load_more()
    }

    pub fn visible_items(&self) -> Vec<&DisplayItem> {
        self.state.visible_items()
    }

    pub fn remount(&mut self) {
        self.state.remount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Embedded, Rendered, RemotePost, Term};
    use pretty_assertions::assert_eq;

    fn post(id: u64, category: &str) -> RemotePost {
        RemotePost {
            id,
            date: "2024-05-10T14:30:00".to_string(),
            slug: format!("p{}", id),
            link: None,
            title: Rendered {
                rendered: format!("Post {}", id),
            },
            excerpt: Rendered::default(),
            content: Rendered::default(),
            embedded: Some(Embedded {
                featured_media: vec![],
                terms: vec![vec![Term {
                    id: None,
                    name: category.to_string(),
                }]],
            }),
        }
    }

    fn page(ids: &[u64], total_pages: Option<u32>) -> PostPage {
        PostPage {
            posts: ids.iter().map(|&id| post(id, "Cursos")).collect(),
            total_pages,
            total_posts: None,
        }
    }

    fn load(state: &mut FeedState, n: u32, result: Result<PostPage, FetchError>) -> LoadOutcome {
        let ticket = state.begin_load(n).expect("load accepted");
        state.complete_load(ticket, result)
    }

    fn ids(state: &FeedState) -> Vec<u64> {
        state.items().iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_initial_state() {
        let state = FeedState::default();
        assert_eq!(state.current_page(), 0);
        assert_eq!(state.total_pages(), 1);
        assert!(state.items().is_empty());
        assert!(state.should_load_more());
        assert!(!state.is_end_of_list());
    }

    #[test]
    fn test_phases_are_exclusive() {
        let mut state = FeedState::default();
        let t = state.begin_load(1).unwrap();
        assert!(state.is_loading_initial());
        assert!(!state.is_loading_more());
        assert!(!state.should_load_more());
        state.complete_load(t, Ok(page(&[1], Some(2))));

        let t = state.begin_load(2).unwrap();
        assert!(state.is_loading_more());
        assert!(!state.is_loading_initial());
        state.complete_load(t, Ok(page(&[2], Some(2))));
        assert_eq!(state.phase(), LoadPhase::Idle);
    }

    #[test]
    fn test_pages_append_in_order() {
        let mut state = FeedState::default();
        assert_eq!(
            load(&mut state, 1, Ok(page(&[1, 2], Some(3)))),
            LoadOutcome::Applied { page: 1, added: 2 }
        );
        load(&mut state, 2, Ok(page(&[3, 4], Some(3))));
        load(&mut state, 3, Ok(page(&[5], Some(3))));
        assert_eq!(ids(&state), vec![1, 2, 3, 4, 5]);
        assert_eq!(state.current_page(), 3);
        assert!(!state.should_load_more());
        assert!(state.is_end_of_list());
    }

    #[test]
    fn test_page_one_replaces_items() {
        let mut state = FeedState::default();
        load(&mut state, 1, Ok(page(&[1, 2], Some(2))));
        load(&mut state, 2, Ok(page(&[3], Some(2))));
        load(&mut state, 1, Ok(page(&[9], Some(2))));
        assert_eq!(ids(&state), vec![9]);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_begin_load_rejections() {
        let mut state = FeedState::default();
        assert_eq!(state.begin_load(0), Err(LoadRejected::InvalidPage));
        assert_eq!(
            state.begin_load(2),
            Err(LoadRejected::BeyondLastPage {
                page: 2,
                total_pages: 1
            })
        );

        let _t = state.begin_load(1).unwrap();
        assert_eq!(
            state.begin_load(1),
            Err(LoadRejected::InFlight { in_flight: 1 })
        );
    }

    #[test]
    fn test_each_page_loaded_once() {
        let mut state = FeedState::default();
        load(&mut state, 1, Ok(page(&[1], Some(3))));
        load(&mut state, 2, Ok(page(&[2], Some(3))));
        assert_eq!(
            state.begin_load(2),
            Err(LoadRejected::AlreadyLoaded { page: 2 })
        );
    }

    #[test]
    fn test_failure_leaves_state_untouched() {
        let mut state = FeedState::default();
        load(&mut state, 1, Ok(page(&[1, 2], Some(3))));

        let outcome = load(&mut state, 2, Err(FetchError::HttpStatus(503)));
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_pages(), 3);
        assert!(state.last_error().is_some());
        assert!(!state.is_loading());

        // Retry is allowed once loading has cleared
        assert!(state.should_load_more());
        load(&mut state, 2, Ok(page(&[3], Some(3))));
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_missing_total_pages_header_keeps_previous() {
        let mut state = FeedState::default();
        load(&mut state, 1, Ok(page(&[1], Some(4))));
        load(&mut state, 2, Ok(page(&[2], None)));
        assert_eq!(state.total_pages(), 4);
    }

    #[test]
    fn test_total_pages_clamped() {
        let mut state = FeedState::default();
        load(&mut state, 1, Ok(page(&[], Some(0))));
        assert_eq!(state.total_pages(), 1);

        let mut state = FeedState::default();
        load(&mut state, 1, Ok(page(&[1], Some(3))));
        load(&mut state, 2, Ok(page(&[2], Some(1))));
        assert_eq!(state.total_pages(), 2);
        assert!(!state.should_load_more());
    }

    #[test]
    fn test_stale_result_after_remount_discarded() {
        let mut state = FeedState::default();
        let old = state.begin_load(1).unwrap();
        state.remount();
        let fresh = state.begin_load(1).unwrap();

        assert_eq!(state.complete_load(old, Ok(page(&[1], Some(1)))), LoadOutcome::Stale);
        assert!(state.items().is_empty());
        assert!(state.is_loading_initial());

        state.complete_load(fresh, Ok(page(&[2], Some(1))));
        assert_eq!(ids(&state), vec![2]);
    }

    #[test]
    fn test_remount_keeps_filter() {
        let mut state = FeedState::default();
        state.set_filter(CategoryFilter::category("Eventos"));
        load(&mut state, 1, Ok(page(&[1], Some(2))));
        state.remount();
        assert_eq!(state.active_filter(), &CategoryFilter::category("Eventos"));
        assert_eq!(state.current_page(), 0);
        assert!(state.items().is_empty());
    }

    #[test]
    fn test_filter_is_derived_view() {
        let mut state = FeedState::default();
        let ticket = state.begin_load(1).unwrap();
        state.complete_load(
            ticket,
            Ok(PostPage {
                posts: vec![post(1, "Cursos"), post(2, "Eventos"), post(3, "Cursos")],
                total_pages: Some(1),
                total_posts: Some(3),
            }),
        );

        assert!(state.set_filter(CategoryFilter::category("Cursos")));
        let visible: Vec<u64> = state.visible_items().iter().map(|i| i.id).collect();
        assert_eq!(visible, vec![1, 3]);
        assert_eq!(state.items().len(), 3);
        assert_eq!(state.total_posts(), Some(3));

        assert!(!state.set_filter(CategoryFilter::category("Cursos")));
        state.set_filter(CategoryFilter::category("Nada"));
        assert_eq!(state.visible_len(), 0);
        state.set_filter(CategoryFilter::All);
        assert_eq!(state.visible_len(), 3);
    }

    #[test]
    fn test_abandoned_load_unblocks_next_request() {
        let mut state = FeedState::default();
        let ticket = state.begin_load(1).unwrap();
        let other = PageTicket {
            generation: ticket.generation() + 1,
            page: 1,
        };
        assert_eq!(state.abandon_load(other, "x"), LoadOutcome::Stale);
        assert!(state.is_loading_initial());

        assert_eq!(
            state.abandon_load(ticket, "task panicked"),
            LoadOutcome::Failed("task panicked".to_string())
        );
        assert!(!state.is_loading());
        assert_eq!(state.last_error(), Some("task panicked"));
        assert!(state.begin_load(1).is_ok());
    }
}
