//! Debounced search box.
//!
//! Each keystroke replaces the query and restarts a 300 ms quiet period. Only
//! the newest query's results are ever stored: the pending timer is aborted and
//! a generation counter rejects any lookup that finishes late.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use uuid::Uuid;

use crate::feed::loader::decorate;
use crate::models::quote::Quote;
use crate::store::{QuoteStore, StoreError};
use crate::viewer::notifications::Notifier;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum SearchState {
    /// Blank query. No results view at all.
    Idle,
    /// Waiting out the debounce window.
    Pending,
    Loading,
    Ready(Vec<Quote>),
    /// The query ran and matched nothing.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub query: String,
    #[serde(flatten)]
    pub state: SearchState,
}

struct Inner {
    query: String,
    generation: u64,
    state: SearchState,
}

pub struct SearchBox {
    inner: Arc<Mutex<Inner>>,
    timer: Option<JoinHandle<()>>,
    store: Arc<dyn QuoteStore>,
    notifier: Notifier,
}

impl SearchBox {
    pub fn new(store: Arc<dyn QuoteStore>, notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                query: String::new(),
                generation: 0,
                state: SearchState::Idle,
            })),
            timer: None,
            store,
            notifier,
        }
    }

    /// Replaces the query. `user_id` decides which like/save flags the results carry.
    pub fn set_query(&mut self, query: &str, user_id: Option<Uuid>) {
        self.cancel_timer();
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.query = query.to_string();
            if query.trim().is_empty() {
                inner.state = SearchState::Idle;
                return;
            }
            inner.state = SearchState::Pending;
            inner.generation
        };

        let needle = query.trim().to_string();
        let inner = Arc::clone(&self.inner);
        let store = Arc::clone(&self.store);
        let notifier = self.notifier.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            {
                let mut guard = inner.lock();
                if guard.generation != generation {
                    return;
                }
                guard.state = SearchState::Loading;
            }

            let outcome = run_search(store.as_ref(), &needle, user_id).await;

            let mut guard = inner.lock();
            if guard.generation != generation {
                debug!(query = %needle, "Discarding stale search results");
                return;
            }
            guard.state = match outcome {
                Ok(results) if results.is_empty() => SearchState::Empty,
                Ok(results) => SearchState::Ready(results),
                Err(e) => {
                    error!(query = %needle, "Error searching quotes: {e}");
                    notifier.error("Failed to search quotes");
                    SearchState::Failed("Failed to search quotes".to_string())
                }
            };
        }));
    }

    /// Drops the query, any pending lookup, and any results.
    pub fn clear(&mut self) {
        self.cancel_timer();
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.query.clear();
        inner.state = SearchState::Idle;
    }

    pub fn view(&self) -> SearchView {
        let inner = self.inner.lock();
        SearchView {
            query: inner.query.clone(),
            state: inner.state.clone(),
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SearchBox {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Case-insensitive substring match on content or author, most liked first.
pub async fn run_search(
    store: &dyn QuoteStore,
    needle: &str,
    user_id: Option<Uuid>,
) -> Result<Vec<Quote>, StoreError> {
    let rows = store.search_quotes(needle, SEARCH_LIMIT).await?;
    decorate(store, user_id, rows).await
}
