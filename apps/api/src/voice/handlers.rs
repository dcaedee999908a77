use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::viewer::ViewerHandle;
use crate::voice::{speech_text, status, VoiceStatus, NOT_CONFIGURED};

/// GET /api/v1/voice/status
pub async fn handle_voice_status(State(state): State<AppState>) -> Json<VoiceStatus> {
    Json(status(state.voice.as_ref()))
}

/// POST /api/v1/quotes/:id/speech
pub async fn handle_speech(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notifier = viewer.lock().await.snapshot().notifier;
    let Some(voice) = state.voice.as_ref() else {
        notifier.error(NOT_CONFIGURED);
        return Err(AppError::Unavailable(NOT_CONFIGURED.to_string()));
    };

    let quote = state
        .store
        .find_quote(quote_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quote {quote_id} not found")))?;

    match voice
        .text_to_speech(&speech_text(&quote.content, &quote.author))
        .await
    {
        Ok(audio) => Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio)),
        Err(e) => {
            error!(%quote_id, "Error playing quote: {e}");
            notifier.error(e.user_message());
            Err(e.into())
        }
    }
}
