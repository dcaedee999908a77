//! Per-client interaction state.
//!
//! A viewer is what one open app instance sees: its session, its page of
//! quotes, the card cursor, the search box, the auth form, and its toasts.
//! Clients identify themselves with the `x-viewer-id` header.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::auth::flow::{AuthFlow, AuthMode};
use crate::auth::Session;
use crate::errors::AppError;
use crate::explore::search::SearchBox;
use crate::feed::commands::InteractionCommand;
use crate::feed::loader::load_feed;
use crate::feed::navigation::{CardCursor, CursorView};
use crate::feed::state::{QuoteFeed, SharedFeed};
use crate::feed::sync::MutationQueue;
use crate::models::interaction::ToggleKind;
use crate::models::quote::Quote;
use crate::store::{QuoteStore, StoreError};

pub mod handlers;
pub mod notifications;
pub mod registry;

pub use notifications::Notifier;
pub use registry::{ViewerHandle, ViewerRegistry};

/// Actions that need a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatedAction {
    Like,
    Save,
    Report,
}

impl GatedAction {
    fn verb(&self) -> &'static str {
        match self {
            GatedAction::Like => "like",
            GatedAction::Save => "save",
            GatedAction::Report => "report",
        }
    }

    pub fn toggle_kind(&self) -> Option<ToggleKind> {
        match self {
            GatedAction::Like => Some(ToggleKind::Like),
            GatedAction::Save => Some(ToggleKind::Save),
            GatedAction::Report => None,
        }
    }
}

impl From<ToggleKind> for GatedAction {
    fn from(kind: ToggleKind) -> Self {
        match kind {
            ToggleKind::Like => GatedAction::Like,
            ToggleKind::Save => GatedAction::Save,
        }
    }
}

/// An action attempted while signed out, resumed after the next sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingAction {
    pub action: GatedAction,
    pub quote_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct FeedView {
    pub quotes: Vec<Quote>,
    pub current: Option<Quote>,
    pub cursor: CursorView,
    pub signed_in: bool,
}

/// Copied out of a viewer so slow backend calls run without its lock held.
#[derive(Clone)]
pub struct ViewerSnapshot {
    pub user_id: Option<Uuid>,
    pub notifier: Notifier,
}

pub struct Viewer {
    pub id: Uuid,
    pub session: Option<Session>,
    pub feed: SharedFeed,
    pub cursor: CardCursor,
    pub search: SearchBox,
    pub auth_flow: AuthFlow,
    pub notifier: Notifier,
    pending: Option<PendingAction>,
    mutations: MutationQueue,
}

impl Viewer {
    /// Must be called inside a tokio runtime; spawns the mutation worker.
    pub fn new(id: Uuid, store: Arc<dyn QuoteStore>, loop_cards: bool) -> Self {
        let feed = QuoteFeed::shared();
        let notifier = Notifier::new();
        let mutations = MutationQueue::spawn(Arc::clone(&store), feed.clone(), notifier.clone());
        Self {
            id,
            session: None,
            feed,
            cursor: CardCursor::new(0, 0, loop_cards),
            search: SearchBox::new(store, notifier.clone()),
            auth_flow: AuthFlow::new(AuthMode::Login),
            notifier,
            pending: None,
            mutations,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(Session::user_id)
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            user_id: self.user_id(),
            notifier: self.notifier.clone(),
        }
    }

    /// The session, or `Unauthorized` after remembering what the user tried.
    pub fn require_session(
        &mut self,
        action: GatedAction,
        quote_id: Uuid,
    ) -> Result<&Session, AppError> {
        if self.session.is_none() {
            self.defer(action, quote_id);
            return Err(AppError::Unauthorized(format!(
                "Please sign in to {} quotes",
                action.verb()
            )));
        }
        self.session
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("Please sign in".to_string()))
    }

    /// Remembers a gated action so it can resume after sign-in.
    pub fn defer(&mut self, action: GatedAction, quote_id: Uuid) {
        self.pending = Some(PendingAction { action, quote_id });
    }

    pub fn take_pending(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Refetches the page for the current session, keeping the cursor in range.
    pub async fn reload_feed(&mut self, store: &dyn QuoteStore, limit: i64) -> Result<(), StoreError> {
        let quotes = load_feed(store, self.session.as_ref(), limit).await?;
        let total = quotes.len();
        self.feed.lock().replace(quotes);
        self.cursor.set_total(total);
        Ok(())
    }

    /// Flips like or save on a loaded quote and queues the remote write.
    pub fn toggle(&mut self, quote_id: Uuid, kind: ToggleKind) -> Result<Quote, AppError> {
        let user_id = self.require_session(kind.into(), quote_id)?.user_id();
        let (updated, cmd, epoch, seq) = {
            let mut feed = self.feed.lock();
            let current = feed
                .flag(quote_id, kind)
                .ok_or_else(|| AppError::NotFound(format!("Quote {quote_id} not found")))?;
            let cmd = InteractionCommand::toggle(quote_id, kind, current);
            let seq = feed.track(&cmd);
            let updated = feed
                .apply(&cmd)
                .ok_or_else(|| AppError::NotFound(format!("Quote {quote_id} not found")))?;
            (updated, cmd, feed.epoch(), seq)
        };
        self.mutations.submit(user_id, cmd, epoch, seq);
        Ok(updated)
    }

    /// Waits for every queued remote write to settle.
    pub async fn settle(&self) {
        self.mutations.flush().await;
    }

    pub fn sign_in(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Local half of sign-out. Always runs, whatever the auth service said.
    pub fn sign_out_locally(&mut self) {
        if let Some(session) = self.session.take() {
            info!(viewer_id = %self.id, user_id = %session.user_id(), "Viewer signed out");
        }
        self.feed.lock().clear_interaction_flags();
        self.search.clear();
        self.pending = None;
        self.auth_flow = AuthFlow::new(AuthMode::Login);
    }

    pub fn feed_view(&self, now: Instant) -> FeedView {
        let feed = self.feed.lock();
        FeedView {
            quotes: feed.quotes().to_vec(),
            current: feed.get(self.cursor.index()).cloned(),
            cursor: self.cursor.view(now),
            signed_in: self.session.is_some(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::{AuthGrant, AuthUser, UserMetadata};
    use crate::store::memory::MemoryStore;
    use chrono::Utc;

    pub(crate) fn session_for(user_id: Uuid) -> Session {
        Session::from_grant(
            AuthGrant {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                expires_in: 3600,
                user: AuthUser {
                    id: user_id,
                    email: Some("reader@example.com".to_string()),
                    user_metadata: UserMetadata::default(),
                },
            },
            Utc::now(),
        )
    }

    async fn viewer_with_quotes(n: i64) -> (Arc<MemoryStore>, Viewer) {
        let store = Arc::new(MemoryStore::new());
        for i in 0..n {
            store.seed_quote(&format!("quote {i}"), "Anon", 3, 1, i);
        }
        let mut viewer = Viewer::new(Uuid::new_v4(), store.clone(), false);
        viewer.reload_feed(store.as_ref(), 20).await.unwrap();
        (store, viewer)
    }

    #[tokio::test]
    async fn test_toggle_requires_session_and_remembers_action() {
        let (_store, mut viewer) = viewer_with_quotes(2).await;
        let id = viewer.feed.lock().quotes()[0].id;
        let err = viewer.toggle(id, ToggleKind::Save).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Please sign in to save quotes"));
        assert_eq!(
            viewer.take_pending(),
            Some(PendingAction {
                action: GatedAction::Save,
                quote_id: id
            })
        );
    }

    #[tokio::test]
    async fn test_toggle_unknown_quote() {
        let (_store, mut viewer) = viewer_with_quotes(1).await;
        viewer.sign_in(session_for(Uuid::new_v4()));
        let err = viewer.toggle(Uuid::new_v4(), ToggleKind::Like).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_like_persists_and_reloads() {
        let (store, mut viewer) = viewer_with_quotes(3).await;
        let user = Uuid::new_v4();
        viewer.sign_in(session_for(user));
        let id = viewer.feed.lock().quotes()[1].id;

        let liked = viewer.toggle(id, ToggleKind::Like).unwrap();
        assert!(liked.is_liked);
        assert_eq!(liked.like_count, 4);
        viewer.settle().await;
        assert_eq!(store.quote(id).unwrap().like_count, 4);

        viewer.reload_feed(store.as_ref(), 20).await.unwrap();
        assert_eq!(viewer.feed.lock().flag(id, ToggleKind::Like), Some(true));
    }

    #[tokio::test]
    async fn test_sign_out_clears_flags_and_search() {
        let (store, mut viewer) = viewer_with_quotes(3).await;
        viewer.sign_in(session_for(Uuid::new_v4()));
        let id = viewer.feed.lock().quotes()[0].id;
        viewer.toggle(id, ToggleKind::Like).unwrap();
        viewer.toggle(id, ToggleKind::Save).unwrap();
        viewer.search.set_query("quote", viewer.user_id());
        viewer.settle().await;

        viewer.sign_out_locally();
        assert!(viewer.session.is_none());
        assert!(viewer
            .feed
            .lock()
            .quotes()
            .iter()
            .all(|q| !q.is_liked && !q.is_saved));
        assert_eq!(viewer.search.view().query, "");

        viewer.reload_feed(store.as_ref(), 20).await.unwrap();
        assert!(!viewer.feed_view(Instant::now()).signed_in);
        assert!(viewer
            .feed
            .lock()
            .quotes()
            .iter()
            .all(|q| !q.is_liked && !q.is_saved));
    }

    #[tokio::test]
    async fn test_reload_clamps_cursor() {
        let (store, mut viewer) = viewer_with_quotes(5).await;
        viewer.cursor.go_to_last(Instant::now());
        assert_eq!(viewer.cursor.index(), 4);
        viewer.reload_feed(store.as_ref(), 2).await.unwrap();
        assert_eq!(viewer.cursor.index(), 1);
        let view = viewer.feed_view(Instant::now());
        assert_eq!(view.current.map(|q| q.content), Some("quote 1".to_string()));
    }
}
