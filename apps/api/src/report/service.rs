use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interaction::InteractionKind;
use crate::report::validation::{validate_report, ReportForm};
use crate::store::QuoteStore;

/// The client closes the confirmation this long after a successful report.
pub const AUTO_CLOSE_AFTER_MS: u64 = 2000;

#[derive(Debug, Serialize)]
pub struct ReportReceipt {
    pub quote_id: Uuid,
    pub message: &'static str,
    pub auto_close_after_ms: u64,
}

/// Field checks run before the sign-in check so the form shows them either way.
/// `user_id` is `None` for a signed-out viewer.
pub async fn submit_report(
    store: &dyn QuoteStore,
    user_id: Option<Uuid>,
    quote_id: Uuid,
    form: &ReportForm,
) -> Result<ReportReceipt, AppError> {
    if let Err(errors) = validate_report(form) {
        return Err(AppError::UnprocessableEntity(
            serde_json::to_string(&errors).unwrap_or_default(),
        ));
    }
    let user_id = user_id.ok_or_else(|| {
        AppError::Unauthorized("You must be signed in to submit a report".to_string())
    })?;

    if store.find_quote(quote_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Quote {quote_id} not found")));
    }
    // Read-then-write; a concurrent duplicate can slip through.
    if store
        .find_interaction(user_id, quote_id, InteractionKind::Report)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "You have already reported this quote".to_string(),
        ));
    }

    store
        .insert_interaction(user_id, quote_id, InteractionKind::Report)
        .await
        .map_err(|e| {
            error!(%quote_id, %user_id, "Error submitting report: {e}");
            AppError::Failed("Failed to submit report. Please try again.".to_string())
        })?;

    info!(%quote_id, %user_id, "Report submitted");
    Ok(ReportReceipt {
        quote_id,
        message: "Report submitted successfully",
        auto_close_after_ms: AUTO_CLOSE_AFTER_MS,
    })
}
