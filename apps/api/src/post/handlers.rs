use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::models::quote::Quote;
use crate::post::{post_quote, PostForm};
use crate::state::AppState;
use crate::viewer::{ViewerHandle, ViewerSnapshot};

/// POST /api/v1/quotes
pub async fn handle_post_quote(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
    Json(form): Json<PostForm>,
) -> Result<(StatusCode, Json<Quote>), AppError> {
    let ViewerSnapshot { user_id, notifier } = viewer.lock().await.snapshot();
    let user_id = user_id.ok_or_else(|| AppError::Unauthorized("Please sign in to post quotes".to_string()))?;
    match post_quote(state.store.as_ref(), user_id, &form).await {
        Ok(quote) => {
            notifier.success("Quote posted successfully!");
            Ok((StatusCode::CREATED, Json(quote)))
        }
        Err(e) => {
            if let AppError::Failed(msg) = &e {
                notifier.error(msg.clone());
            }
            Err(e)
        }
    }
}
