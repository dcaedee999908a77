use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::report::service::{submit_report, ReportReceipt};
use crate::report::validation::ReportForm;
use crate::state::AppState;
use crate::viewer::{GatedAction, ViewerHandle, ViewerSnapshot};

/// POST /api/v1/quotes/:id/report
pub async fn handle_report(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
    Path(quote_id): Path<Uuid>,
    Json(form): Json<ReportForm>,
) -> Result<(StatusCode, Json<ReportReceipt>), AppError> {
    let ViewerSnapshot { user_id, notifier } = viewer.lock().await.snapshot();
    match submit_report(state.store.as_ref(), user_id, quote_id, &form).await {
        Ok(receipt) => {
            notifier.success(receipt.message);
            Ok((StatusCode::CREATED, Json(receipt)))
        }
        Err(e @ AppError::Unauthorized(_)) => {
            viewer.lock().await.defer(GatedAction::Report, quote_id);
            Err(e)
        }
        Err(e) => Err(e),
    }
}
