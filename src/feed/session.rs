//! Chat session - one conversation's live machinery
//!
//! Opening a session wires up the subscription, the feed task, the
//! expiry sweep loop and the countdown loop, and hands back watch
//! channels for the ordered view and the countdown labels. Dropping the
//! session (or calling [`ChatSession::shutdown`]) unsubscribes and stops
//! every task it started, on every exit path.

use super::pagination::PaginationCursor;
use super::synchronizer::run_feed;
use super::view::{SharedView, View};
use crate::core::{AppError, AppState};
use crate::entities::Message;
use crate::expiry::{ExpiryScheduler, remaining_labels};
use crate::repositories::MessageRepository;
use crate::store::{DocumentStore, StoreError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::sync::watch;
use tokio::time::{Duration, interval};
use tracing::{info, instrument, warn};

/// Which conversation kind a session is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatScope {
    Direct,
    Group,
}

pub struct ChatSession<S: DocumentStore> {
    view: View,
    messages_rx: watch::Receiver<Vec<Message>>,
    countdown_rx: watch::Receiver<HashMap<String, String>>,
    errors_rx: Option<UnboundedReceiver<StoreError>>,
    cursor: PaginationCursor<S>,
    scheduler: Arc<ExpiryScheduler<S>>,
    shutdown_tx: watch::Sender<bool>,
    closed: bool,
}

impl<S: DocumentStore> ChatSession<S> {
    /// Open the live session for one conversation.
    ///
    /// An unknown conversation id is not an error: the subscription
    /// simply delivers an empty snapshot and then stays silent.
    #[instrument(skip(state))]
    pub fn open(state: &AppState<S>, scope: ChatScope, conversation_id: &str) -> Self {
        info!("Opening chat session");

        let repo: MessageRepository<S> = match scope {
            ChatScope::Direct => state.chat_messages.clone(),
            ChatScope::Group => state.group_messages.clone(),
        };
        let view = SharedView::new();

        let (updates_tx, messages_rx) = watch::channel(Vec::new());
        let (errors_tx, errors_rx) = unbounded_channel();
        let (nudges_tx, nudges_rx) = unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(run_feed(
            repo.clone(),
            conversation_id.to_string(),
            view.clone(),
            updates_tx,
            errors_tx,
            nudges_tx,
            shutdown_rx.clone(),
        ));

        let scheduler = Arc::new(ExpiryScheduler::new(
            repo.clone(),
            conversation_id,
            view.clone(),
        ));
        tokio::spawn(run_sweeps(
            scheduler.clone(),
            state.config.sweep_interval_ms,
            nudges_rx,
            shutdown_rx.clone(),
        ));

        let (countdown_tx, countdown_rx) = watch::channel(HashMap::new());
        tokio::spawn(run_countdown(
            view.clone(),
            state.config.countdown_tick_ms,
            countdown_tx,
            shutdown_rx,
        ));

        let cursor = PaginationCursor::new(
            repo,
            conversation_id,
            view.clone(),
            state.config.page_size,
        );

        Self {
            view,
            messages_rx,
            countdown_rx,
            errors_rx: Some(errors_rx),
            cursor,
            scheduler,
            shutdown_tx,
            closed: false,
        }
    }

    /// Watch channel carrying the ordered view, newest first.
    pub fn messages(&self) -> watch::Receiver<Vec<Message>> {
        self.messages_rx.clone()
    }

    /// Watch channel carrying countdown labels keyed by message id.
    pub fn countdowns(&self) -> watch::Receiver<HashMap<String, String>> {
        self.countdown_rx.clone()
    }

    /// Receiver of subscription errors, one per failed attempt; the
    /// feed keeps retrying with backoff behind them. `None` after the
    /// first take.
    pub fn take_errors(&mut self) -> Option<UnboundedReceiver<StoreError>> {
        self.errors_rx.take()
    }

    /// Current ordered copy of the loaded view.
    pub fn snapshot(&self) -> Vec<Message> {
        self.view.snapshot()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    /// Load the next page of older history. See
    /// [`PaginationCursor::load_more`].
    pub async fn load_more(&self) -> Result<Vec<Message>, AppError> {
        self.cursor.load_more().await
    }

    /// Run one expiry sweep immediately, outside the timer schedule.
    pub async fn sweep_now(&self) -> usize {
        self.scheduler.sweep_once(Utc::now()).await
    }

    /// Stop the subscription and every task this session started.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        info!("Closing chat session");
        let _ = self.shutdown_tx.send(true);
    }
}

impl<S: DocumentStore> Drop for ChatSession<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sweep loop: fires on the fixed interval and on every snapshot nudge
/// from the feed, until shutdown.
async fn run_sweeps<S: DocumentStore>(
    scheduler: Arc<ExpiryScheduler<S>>,
    interval_ms: u64,
    mut nudges: UnboundedReceiver<()>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(Duration::from_millis(interval_ms));
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                scheduler.sweep_once(Utc::now()).await;
            }
            Some(()) = nudges.recv() => {
                scheduler.sweep_once(Utc::now()).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    info!("Sweep task terminated");
}

/// Countdown loop: republishes remaining-time labels on the fast tick.
async fn run_countdown(
    view: View,
    tick_ms: u64,
    labels_tx: watch::Sender<HashMap<String, String>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(Duration::from_millis(tick_ms));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let labels = remaining_labels(&view.snapshot(), Utc::now());
                if labels_tx.send(labels).is_err() {
                    warn!("Countdown receiver gone, stopping");
                    break;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    info!("Countdown task terminated");
}
