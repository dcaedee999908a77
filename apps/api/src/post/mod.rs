//! Sharing a new quote.

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::quote::{NewQuote, Quote};
use crate::store::QuoteStore;

pub mod handlers;

pub const MAX_CONTENT_LEN: usize = 500;
pub const MAX_AUTHOR_LEN: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), String> {
        let content = self.content.trim();
        let author = self.author.trim();
        if content.is_empty() || author.is_empty() {
            return Err("Please fill in all fields".to_string());
        }
        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(format!(
                "Quote must not exceed {MAX_CONTENT_LEN} characters"
            ));
        }
        if author.chars().count() > MAX_AUTHOR_LEN {
            return Err(format!(
                "Author must not exceed {MAX_AUTHOR_LEN} characters"
            ));
        }
        Ok(())
    }
}

/// Inserts a trimmed quote owned by `user_id` with zeroed counters.
pub async fn post_quote(
    store: &dyn QuoteStore,
    user_id: Uuid,
    form: &PostForm,
) -> Result<Quote, AppError> {
    form.validate().map_err(AppError::Validation)?;
    let new_quote = NewQuote {
        content: form.content.trim().to_string(),
        author: form.author.trim().to_string(),
        user_id,
    };
    let row = store.insert_quote(&new_quote).await.map_err(|e| {
        error!(%user_id, "Error posting quote: {e}");
        AppError::Failed("Failed to post quote".to_string())
    })?;
    info!(quote_id = %row.id, %user_id, "Quote posted");
    Ok(Quote::from(row))
}
