//! Pagination Cursor
//!
//! Backward loading of history older than the live window. Pagination
//! walks strictly backward in time, so once a short page is seen the
//! cursor is exhausted for the rest of the session.

use super::view::View;
use crate::core::AppError;
use crate::entities::Message;
use crate::repositories::MessageRepository;
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

struct CursorState {
    /// Creation time of the oldest materialized message.
    last_loaded: Option<DateTime<Utc>>,
    has_more: bool,
}

pub struct PaginationCursor<S: DocumentStore> {
    repo: MessageRepository<S>,
    parent_id: String,
    view: View,
    page_size: usize,
    state: Mutex<CursorState>,
    /// Single-flight guard: at most one fetch per conversation.
    in_flight: tokio::sync::Mutex<()>,
}

impl<S: DocumentStore> PaginationCursor<S> {
    pub fn new(repo: MessageRepository<S>, parent_id: &str, view: View, page_size: usize) -> Self {
        Self {
            repo,
            parent_id: parent_id.to_string(),
            view,
            page_size,
            state: Mutex::new(CursorState {
                last_loaded: None,
                has_more: true,
            }),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().expect("cursor lock poisoned").has_more
    }

    /// Load the next page of older messages into the view.
    ///
    /// Returns the fetched batch (newest first). A call while another is
    /// in flight, or after the cursor is exhausted, is a no-op that
    /// touches nothing remote. A fetch error leaves the cursor and the
    /// loaded view exactly as they were.
    #[instrument(skip(self), fields(conversation = %self.parent_id))]
    pub async fn load_more(&self) -> Result<Vec<Message>, AppError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Fetch already in flight, ignoring");
            return Ok(Vec::new());
        };

        let before = {
            let state = self.state.lock().expect("cursor lock poisoned");
            if !state.has_more {
                debug!("Cursor exhausted, nothing to load");
                return Ok(Vec::new());
            }
            state.last_loaded
        };
        // Before the first explicit page, continue from the oldest
        // message the live window delivered.
        let before = before.or_else(|| self.view.oldest().map(|m| m.timestamp));

        let batch = self
            .repo
            .find_page(&self.parent_id, before, self.page_size)
            .await
            .map_err(|e| {
                warn!("Page fetch failed: {e}");
                AppError::from(e)
            })?;

        {
            let mut state = self.state.lock().expect("cursor lock poisoned");
            if batch.len() < self.page_size {
                state.has_more = false;
            }
            if let Some(oldest) = batch.last() {
                state.last_loaded = Some(oldest.timestamp);
            }
        }

        debug!(loaded = batch.len(), "Page loaded");
        self.view.append_older(&batch);
        Ok(batch)
    }
}
