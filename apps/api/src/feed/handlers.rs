use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, error};
use uuid::Uuid;

use crate::errors::AppError;
use crate::feed::gestures::{DragEnd, KeyPress, NavAction};
use crate::models::interaction::ToggleKind;
use crate::models::quote::Quote;
use crate::state::AppState;
use crate::viewer::{FeedView, ViewerHandle};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigateRequest {
    Next,
    Previous,
    First,
    Last,
    Undo,
    Index { index: usize },
    SetLoop { enabled: bool },
}

/// GET /api/v1/feed
pub async fn handle_get_feed(ViewerHandle(viewer): ViewerHandle) -> Json<FeedView> {
    let viewer = viewer.lock().await;
    Json(viewer.feed_view(Instant::now()))
}

/// POST /api/v1/feed/refresh
pub async fn handle_refresh_feed(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
) -> Result<Json<FeedView>, AppError> {
    let mut viewer = viewer.lock().await;
    if let Err(e) = viewer
        .reload_feed(state.store.as_ref(), state.config.feed_page_size)
        .await
    {
        error!(viewer_id = %viewer.id, "Error fetching quotes: {e}");
        viewer.notifier.error("Failed to load quotes");
        return Err(e.into());
    }
    Ok(Json(viewer.feed_view(Instant::now())))
}

/// POST /api/v1/feed/navigate
pub async fn handle_navigate(
    ViewerHandle(viewer): ViewerHandle,
    Json(req): Json<NavigateRequest>,
) -> Json<FeedView> {
    let mut viewer = viewer.lock().await;
    let now = Instant::now();
    let cursor = &mut viewer.cursor;
    match req {
        NavigateRequest::Next => cursor.perform(NavAction::Next, now),
        NavigateRequest::Previous => cursor.perform(NavAction::Previous, now),
        NavigateRequest::First => cursor.perform(NavAction::First, now),
        NavigateRequest::Last => cursor.perform(NavAction::Last, now),
        NavigateRequest::Undo => cursor.perform(NavAction::Undo, now),
        NavigateRequest::Index { index } => cursor.go_to_index(index, now),
        NavigateRequest::SetLoop { enabled } => {
            cursor.set_loop(enabled);
            false
        }
    };
    Json(viewer.feed_view(now))
}

/// POST /api/v1/feed/key
pub async fn handle_key(
    ViewerHandle(viewer): ViewerHandle,
    Json(press): Json<KeyPress>,
) -> Json<FeedView> {
    let mut viewer = viewer.lock().await;
    let now = Instant::now();
    match press.action() {
        Some(action) => {
            viewer.cursor.perform(action, now);
        }
        None => debug!(key = %press.key, "Unmapped key ignored"),
    }
    Json(viewer.feed_view(now))
}

/// POST /api/v1/feed/gesture
pub async fn handle_gesture(
    ViewerHandle(viewer): ViewerHandle,
    Json(drag): Json<DragEnd>,
) -> Json<FeedView> {
    let mut viewer = viewer.lock().await;
    let now = Instant::now();
    if let Some(action) = drag.action() {
        viewer.cursor.perform(action, now);
    }
    Json(viewer.feed_view(now))
}

/// POST /api/v1/quotes/:id/like
pub async fn handle_like(
    ViewerHandle(viewer): ViewerHandle,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, AppError> {
    let mut viewer = viewer.lock().await;
    Ok(Json(viewer.toggle(id, ToggleKind::Like)?))
}

/// POST /api/v1/quotes/:id/save
pub async fn handle_save(
    ViewerHandle(viewer): ViewerHandle,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, AppError> {
    let mut viewer = viewer.lock().await;
    Ok(Json(viewer.toggle(id, ToggleKind::Save)?))
}
