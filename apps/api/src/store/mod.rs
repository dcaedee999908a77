//! Row-level access to the hosted relational backend.
//!
//! `AppState` carries an `Arc<dyn QuoteStore>`; production uses `PgQuoteStore`,
//! tests use the in-memory store so services run without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::interaction::{InteractionKind, InteractionRow};
use crate::models::quote::{NewQuote, QuoteRow};
use crate::models::user::{NewProfile, UserProfile};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgQuoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Most recent quotes first.
    async fn recent_quotes(&self, limit: i64) -> Result<Vec<QuoteRow>, StoreError>;

    /// Quotes created at or after `since`, most liked first.
    async fn quotes_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<QuoteRow>, StoreError>;

    /// Every quote, most liked first. Feeds the popular-author aggregation.
    async fn all_quotes(&self) -> Result<Vec<QuoteRow>, StoreError>;

    /// Case-insensitive substring match on content or author, most liked first.
    async fn search_quotes(&self, needle: &str, limit: i64) -> Result<Vec<QuoteRow>, StoreError>;

    /// Quotes whose content contains any of `keywords`, most liked first.
    async fn quotes_with_any_keyword(
        &self,
        keywords: &[&str],
        limit: i64,
    ) -> Result<Vec<QuoteRow>, StoreError>;

    /// Exact author match, most liked first.
    async fn quotes_by_author(&self, author: &str, limit: i64)
        -> Result<Vec<QuoteRow>, StoreError>;

    async fn find_quote(&self, quote_id: Uuid) -> Result<Option<QuoteRow>, StoreError>;

    async fn insert_quote(&self, quote: &NewQuote) -> Result<QuoteRow, StoreError>;

    /// The user's interactions of `kinds` against any of `quote_ids`.
    async fn user_interactions(
        &self,
        user_id: Uuid,
        quote_ids: &[Uuid],
        kinds: &[InteractionKind],
    ) -> Result<Vec<InteractionRow>, StoreError>;

    async fn find_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<Option<InteractionRow>, StoreError>;

    async fn insert_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<InteractionRow, StoreError>;

    /// Returns the number of rows removed.
    async fn delete_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<u64, StoreError>;

    /// Moves the denormalized counter for `kind` by `delta`. No-op for reports.
    async fn adjust_counter(
        &self,
        quote_id: Uuid,
        kind: InteractionKind,
        delta: i32,
    ) -> Result<(), StoreError>;

    /// Quotes the user has interacted with as `kind`, newest interaction first.
    async fn interacted_quotes(
        &self,
        user_id: Uuid,
        kind: InteractionKind,
    ) -> Result<Vec<QuoteRow>, StoreError>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError>;

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, StoreError>;

    async fn insert_profile(&self, profile: &NewProfile) -> Result<UserProfile, StoreError>;

    async fn count_quotes_by_user(&self, user_id: Uuid) -> Result<i64, StoreError>;

    async fn count_followers(&self, user_id: Uuid) -> Result<i64, StoreError>;

    async fn count_following(&self, user_id: Uuid) -> Result<i64, StoreError>;
}
