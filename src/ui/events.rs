//! Application event handling.
//!
//! This module processes background task completion events: page loads,
//! detail lookups and task panics.

use crate::app::{App, AppEvent};
use crate::feed::{DetailState, LoadOutcome};
use tokio::sync::mpsc;

use super::helpers::maybe_load_more;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::PageLoaded { ticket, result } => {
            if let LoadOutcome::Applied { page, added } = app.apply_page(ticket, result) {
                tracing::debug!(page, added, "Page shown");
                // A short page or a narrow filter can leave the sentinel on
                // screen, in which case the next page is due right away.
                maybe_load_more(app, event_tx);
            }
        }
        AppEvent::DetailLoaded {
            generation,
            slug,
            state,
        } => {
            if app.apply_detail(generation, &slug, state) {
                if let DetailState::Failed { error, .. } = &app.detail {
                    app.set_status(format!("Failed to load post: {}", error));
                }
            }
        }
        AppEvent::TaskPanicked {
            task,
            ticket,
            error,
        } => {
            tracing::error!(task, error = %error, "Background task panicked");
            if let Some(ticket) = ticket {
                let outcome = app
                    .feed
                    .abandon_load(ticket, format!("Internal error: {}", error));
                // A stale ticket belongs to an earlier mount; the handle now
                // tracks the live load.
                if let LoadOutcome::Failed(_) = outcome {
                    app.page_load_handle = None;
                }
            }
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}
