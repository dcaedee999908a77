use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::QuoteStore;
use crate::viewer::Viewer;

pub const VIEWER_HEADER: &str = "x-viewer-id";

pub type SharedViewer = Arc<tokio::sync::Mutex<Viewer>>;

struct Entry {
    viewer: SharedViewer,
    last_seen: Mutex<Instant>,
}

#[derive(Default)]
pub struct ViewerRegistry {
    viewers: RwLock<HashMap<Uuid, Entry>>,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, store: Arc<dyn QuoteStore>, loop_cards: bool) -> (Uuid, SharedViewer) {
        let id = Uuid::new_v4();
        let viewer = Arc::new(tokio::sync::Mutex::new(Viewer::new(id, store, loop_cards)));
        self.viewers.write().insert(
            id,
            Entry {
                viewer: Arc::clone(&viewer),
                last_seen: Mutex::new(Instant::now()),
            },
        );
        (id, viewer)
    }

    pub fn get(&self, id: Uuid) -> Option<SharedViewer> {
        let viewers = self.viewers.read();
        let entry = viewers.get(&id)?;
        *entry.last_seen.lock() = Instant::now();
        Some(Arc::clone(&entry.viewer))
    }

    pub fn len(&self) -> usize {
        self.viewers.read().len()
    }

    /// Drops viewers not seen for `max_idle`. Returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut viewers = self.viewers.write();
        let before = viewers.len();
        viewers.retain(|_, e| now.saturating_duration_since(*e.last_seen.lock()) < max_idle);
        let evicted = before - viewers.len();
        if evicted > 0 {
            info!(evicted, remaining = viewers.len(), "Evicted idle viewers");
        }
        evicted
    }
}

pub fn viewer_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(VIEWER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

/// The calling client's viewer, resolved from the `x-viewer-id` header.
pub struct ViewerHandle(pub SharedViewer);

#[async_trait]
impl FromRequestParts<AppState> for ViewerHandle {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let id = viewer_id(&parts.headers).ok_or_else(|| {
            AppError::Validation(format!("Missing or invalid {VIEWER_HEADER} header"))
        })?;
        state
            .viewers
            .get(id)
            .map(ViewerHandle)
            .ok_or_else(|| AppError::NotFound(format!("Viewer {id} not found")))
    }
}
