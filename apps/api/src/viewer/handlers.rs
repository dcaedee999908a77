use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::viewer::notifications::Notice;
use crate::viewer::{FeedView, ViewerHandle};

#[derive(Debug, Default, Deserialize)]
pub struct CreateViewerRequest {
    #[serde(default)]
    pub loop_cards: bool,
}

#[derive(Serialize)]
pub struct CreateViewerResponse {
    pub viewer_id: Uuid,
    pub feed: FeedView,
}

/// POST /api/v1/viewers
pub async fn handle_create_viewer(
    State(state): State<AppState>,
    body: Option<Json<CreateViewerRequest>>,
) -> Result<(StatusCode, Json<CreateViewerResponse>), AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let (viewer_id, viewer) = state.viewers.create(state.store.clone(), req.loop_cards);
    let mut viewer = viewer.lock().await;
    if let Err(e) = viewer
        .reload_feed(state.store.as_ref(), state.config.feed_page_size)
        .await
    {
        error!(%viewer_id, "Error fetching quotes: {e}");
        viewer.notifier.error("Failed to load quotes");
    }
    info!(%viewer_id, active = state.viewers.len(), "Viewer created");
    Ok((
        StatusCode::CREATED,
        Json(CreateViewerResponse {
            viewer_id,
            feed: viewer.feed_view(Instant::now()),
        }),
    ))
}

/// GET /api/v1/notifications
pub async fn handle_notifications(ViewerHandle(viewer): ViewerHandle) -> Json<Vec<Notice>> {
    let viewer = viewer.lock().await;
    Json(viewer.notifier.drain(Instant::now()))
}
