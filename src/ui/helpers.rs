//! Helper functions for UI operations.
//!
//! This module contains utility functions shared across the UI layer,
//! mostly the spawning of background page and detail loads.

use crate::app::{App, AppEvent};
use crate::feed::{fetch_ticket, load_detail, DetailState};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but
/// not handled), panics are converted to `Err(String)` containing the panic
/// message.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Start loading `page` in the background.
///
/// The load is registered with the feed first; when the feed refuses it
/// (another page in flight, past the last page, already loaded) nothing is
/// spawned and `false` is returned.
pub(super) fn spawn_page_load(
    app: &mut App,
    page: u32,
    event_tx: &mpsc::Sender<AppEvent>,
) -> bool {
    let ticket = match app.feed.begin_load(page) {
        Ok(ticket) => ticket,
        Err(rejected) => {
            tracing::debug!(page, reason = %rejected, "Page load not started");
            return false;
        }
    };

    let client = app.client.clone();
    let per_page = app.per_page;
    let tx = event_tx.clone();

    tracing::debug!(page, generation = ticket.generation(), "Spawning page load task");

    app.page_load_handle = Some(tokio::spawn(async move {
        let event = match catch_task_panic(fetch_ticket(&client, ticket, per_page)).await {
            Ok(result) => AppEvent::PageLoaded { ticket, result },
            Err(panic_msg) => {
                tracing::error!(error = %panic_msg, "Page load task panicked");
                AppEvent::TaskPanicked {
                    task: "page_load",
                    ticket: Some(ticket),
                    error: panic_msg,
                }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Failed to send page result (receiver dropped)");
        }
    }));
    true
}

/// Request the next page when the end-of-list sentinel is visible.
///
/// Runs after renders and applied pages. A page whose last attempt failed is
/// left alone here; only user input retries it (see [`load_more_on_scroll`]).
///
/// Returns `true` if a load was spawned.
pub(super) fn maybe_load_more(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    if app.feed.last_error().is_some() {
        return false;
    }
    load_more_on_scroll(app, event_tx)
}

/// Request the next page after the user moved through the list.
///
/// Also retries a failed page, once per key press.
pub(super) fn load_more_on_scroll(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    if !app.wants_more() {
        return false;
    }
    let next = app.feed.current_page().saturating_add(1);
    spawn_page_load(app, next, event_tx)
}

/// Drop everything loaded so far and fetch page 1 again.
pub(super) fn reload_feed(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.remount();
    spawn_page_load(app, 1, event_tx);
}

/// Open the selected post and look it up by slug in the background.
pub(super) fn open_selected(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some((generation, slug)) = app.enter_detail() else {
        return;
    };
    spawn_detail_load(app, generation, slug, event_tx);
}

/// Spawn a slug lookup whose result is tagged with `generation`.
pub(super) fn spawn_detail_load(
    app: &mut App,
    generation: u64,
    slug: String,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let client = app.client.clone();
    let mapper = app.feed.mapper().clone();
    let tx = event_tx.clone();

    tracing::debug!(slug = %slug, generation, "Spawning detail load task");

    app.detail_load_handle = Some(tokio::spawn(async move {
        let event = match catch_task_panic(load_detail(&client, &slug, &mapper)).await {
            Ok(state) => AppEvent::DetailLoaded {
                generation,
                slug,
                state,
            },
            Err(panic_msg) => {
                tracing::error!(error = %panic_msg, "Detail load task panicked");
                AppEvent::DetailLoaded {
                    generation,
                    slug: slug.clone(),
                    state: DetailState::Failed {
                        slug,
                        error: format!("Internal error: {}", panic_msg),
                    },
                }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Failed to send detail result (receiver dropped)");
        }
    }));
}

/// Re-run a failed page load the user asked to retry.
///
/// A failure on page 1 retries the initial load, any later failure retries
/// the page after the last one applied.
pub(super) fn retry_after_error(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    if app.feed.last_error().is_none() || app.feed.is_loading() {
        return false;
    }
    let page = app.feed.current_page().saturating_add(1);
    spawn_page_load(app, page, event_tx)
}
