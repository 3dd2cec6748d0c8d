//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on the current view.

use crate::app::{App, AppEvent, View};
use crate::feed::CategoryFilter;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::validate_url_for_open;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{load_more_on_scroll, open_selected, reload_feed, retry_after_error};
use super::Action;

/// Lines moved per page in the detail view.
const DETAIL_PAGE_LINES: usize = 20;

/// Main input dispatch function.
///
/// Routes input to the appropriate handler based on current mode and view.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Handle help overlay input first (captures all keys when visible)
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    match app.view {
        View::List => handle_list_input(app, code, modifiers, event_tx),
        View::Detail => handle_detail_input(app, code, modifiers),
    }
}

fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input in the post list.
fn handle_list_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::List);

    match action {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::PageDown) => app.page_down(),
        Some(KbAction::PageUp) => app.page_up(),
        Some(KbAction::JumpTop) => app.jump_top(),
        Some(KbAction::JumpBottom) => app.jump_bottom(),
        Some(KbAction::Select) => {
            open_selected(app, event_tx);
            return Ok(Action::Continue);
        }
        Some(KbAction::NextFilter) => {
            app.next_filter();
        }
        Some(KbAction::PrevFilter) => {
            app.previous_filter();
        }
        Some(KbAction::ClearFilter) | Some(KbAction::Back) => {
            app.set_filter(CategoryFilter::All);
        }
        Some(KbAction::Reload) => {
            if app.feed.last_error().is_some() && !app.feed.items().is_empty() {
                // Keep what is on screen and retry only the page that failed
                retry_after_error(app, event_tx);
            } else {
                reload_feed(app, event_tx);
                app.set_status("Reloading...");
            }
            return Ok(Action::Continue);
        }
        Some(action) => {
            handle_global_action(app, action);
            return Ok(Action::Continue);
        }
        None => return Ok(Action::Continue),
    }

    // Moving the selection or narrowing the filter can bring the end of the
    // list into view.
    load_more_on_scroll(app, event_tx);
    Ok(Action::Continue)
}

/// Handle input in the post detail view.
fn handle_detail_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<Action> {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Detail);

    match action {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::Back) => app.exit_detail(),
        Some(KbAction::ScrollDown) => app.scroll_down(1),
        Some(KbAction::ScrollUp) => app.scroll_up(1),
        Some(KbAction::PageDown) => app.scroll_down(DETAIL_PAGE_LINES),
        Some(KbAction::PageUp) => app.scroll_up(DETAIL_PAGE_LINES),
        Some(action) => handle_global_action(app, action),
        None => {}
    }
    Ok(Action::Continue)
}

/// Actions that behave the same in every view.
fn handle_global_action(app: &mut App, action: KbAction) {
    match action {
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::OpenInBrowser => open_current_link(app),
        _ => {}
    }
}

fn open_current_link(app: &mut App) {
    let Some(url) = app.current_link().map(str::to_string) else {
        app.set_status("Post has no public link");
        return;
    };
    // SEC: Validate URL before open::that() to prevent command injection
    if let Err(e) = validate_url_for_open(&url) {
        app.set_status(e);
    } else if let Err(e) = open::that(&url) {
        app.set_status(format!("Failed to open browser: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ContentClient, PostPage, RemotePost, Rendered};
    use crate::config::Config;
    use std::time::Duration;
    use url::Url;

    fn test_app() -> App {
        let client = ContentClient::new(
            Url::parse("http://127.0.0.1:9/wp-json/wp/v2/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        App::new(client, &Config::default())
    }

    fn load_posts(app: &mut App, n: u64, total_pages: u32) {
        let posts = (0..n)
            .map(|id| RemotePost {
                id,
                date: "2024-01-01T00:00:00".to_string(),
                slug: format!("p{}", id),
                link: None,
                title: Rendered::default(),
                excerpt: Rendered::default(),
                content: Rendered::default(),
                embedded: None,
            })
            .collect();
        let ticket = app.feed.begin_load(1).unwrap();
        app.apply_page(
            ticket,
            Ok(PostPage {
                posts,
                total_pages: Some(total_pages),
                total_posts: None,
            }),
        );
    }

    async fn press(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx).await.unwrap()
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        assert!(matches!(
            press(&mut app, KeyCode::Char('q'), &tx).await,
            Action::Quit
        ));
    }

    #[tokio::test]
    async fn test_scrolling_to_end_requests_next_page() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        app.list_visible_items = 4;
        load_posts(&mut app, 12, 2);

        press(&mut app, KeyCode::Char('j'), &tx).await;
        assert!(!app.feed.is_loading());

        press(&mut app, KeyCode::Char('G'), &tx).await;
        assert_eq!(app.selected, 11);
        assert!(app.feed.is_loading_more());
    }

    #[tokio::test]
    async fn test_enter_opens_detail_and_esc_returns() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        load_posts(&mut app, 3, 1);

        press(&mut app, KeyCode::Enter, &tx).await;
        assert_eq!(app.view, View::Detail);
        assert_eq!(app.detail.slug(), Some("p0"));
        assert!(app.detail_load_handle.is_some());

        press(&mut app, KeyCode::Esc, &tx).await;
        assert_eq!(app.view, View::List);
        assert!(app.detail_load_handle.is_none());
    }

    #[tokio::test]
    async fn test_tab_cycles_filters_and_zero_clears() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        press(&mut app, KeyCode::Tab, &tx).await;
        assert_eq!(
            app.feed.active_filter(),
            &CategoryFilter::category("Notícias")
        );
        press(&mut app, KeyCode::Char('0'), &tx).await;
        assert!(app.feed.active_filter().is_all());
    }

    #[tokio::test]
    async fn test_help_overlay_captures_keys() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        press(&mut app, KeyCode::Char('?'), &tx).await;
        assert!(app.show_help);
        assert!(matches!(
            press(&mut app, KeyCode::Char('q'), &tx).await,
            Action::Continue
        ));
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_reload_remounts() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        load_posts(&mut app, 3, 1);
        let generation = app.feed.generation();
        press(&mut app, KeyCode::Char('r'), &tx).await;
        assert!(app.feed.items().is_empty());
        assert!(app.feed.is_loading_initial());
        assert!(app.feed.generation() > generation);
    }
}
