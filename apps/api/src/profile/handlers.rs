use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::profile::{profile_stats, ProfileStats};
use crate::state::AppState;
use crate::viewer::{ViewerHandle, ViewerSnapshot};

/// GET /api/v1/profile
pub async fn handle_profile(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
) -> Result<Json<ProfileStats>, AppError> {
    let ViewerSnapshot { user_id, notifier } = viewer.lock().await.snapshot();
    let user_id = user_id.ok_or_else(|| AppError::Unauthorized("Please sign in to view your profile".to_string()))?;
    match profile_stats(state.store.as_ref(), user_id).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            if let AppError::Failed(msg) = &e {
                notifier.error(msg.clone());
            }
            Err(e)
        }
    }
}
