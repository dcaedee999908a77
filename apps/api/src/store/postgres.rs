use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::interaction::{InteractionKind, InteractionRow};
use crate::models::quote::{NewQuote, QuoteRow};
use crate::models::user::{NewProfile, UserProfile};
use crate::store::{QuoteStore, StoreError};

const QUOTE_COLUMNS: &str = r#"
    q.id, q.content, q.author, q.user_id, q.like_count, q.save_count,
    q.created_at, q.updated_at, u.username, u.full_name, u.avatar_url
"#;

/// `QuoteStore` over the backend's PostgreSQL tables.
#[derive(Clone)]
pub struct PgQuoteStore {
    pool: PgPool,
}

impl PgQuoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Wraps `needle` for ILIKE, escaping the pattern metacharacters.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl QuoteStore for PgQuoteStore {
    async fn recent_quotes(&self, limit: i64) -> Result<Vec<QuoteRow>, StoreError> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q LEFT JOIN users u ON u.id = q.user_id
             ORDER BY q.created_at DESC LIMIT $1"
        );
        Ok(sqlx::query_as::<_, QuoteRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn quotes_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<QuoteRow>, StoreError> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q LEFT JOIN users u ON u.id = q.user_id
             WHERE q.created_at >= $1 ORDER BY q.like_count DESC LIMIT $2"
        );
        Ok(sqlx::query_as::<_, QuoteRow>(&sql)
            .bind(since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn all_quotes(&self) -> Result<Vec<QuoteRow>, StoreError> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q LEFT JOIN users u ON u.id = q.user_id
             ORDER BY q.like_count DESC"
        );
        Ok(sqlx::query_as::<_, QuoteRow>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn search_quotes(&self, needle: &str, limit: i64) -> Result<Vec<QuoteRow>, StoreError> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q LEFT JOIN users u ON u.id = q.user_id
             WHERE q.content ILIKE $1 OR q.author ILIKE $1
             ORDER BY q.like_count DESC LIMIT $2"
        );
        Ok(sqlx::query_as::<_, QuoteRow>(&sql)
            .bind(like_pattern(needle))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn quotes_with_any_keyword(
        &self,
        keywords: &[&str],
        limit: i64,
    ) -> Result<Vec<QuoteRow>, StoreError> {
        let patterns: Vec<String> = keywords.iter().map(|k| like_pattern(k)).collect();
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q LEFT JOIN users u ON u.id = q.user_id
             WHERE q.content ILIKE ANY($1)
             ORDER BY q.like_count DESC LIMIT $2"
        );
        Ok(sqlx::query_as::<_, QuoteRow>(&sql)
            .bind(patterns)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn quotes_by_author(
        &self,
        author: &str,
        limit: i64,
    ) -> Result<Vec<QuoteRow>, StoreError> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q LEFT JOIN users u ON u.id = q.user_id
             WHERE q.author = $1 ORDER BY q.like_count DESC LIMIT $2"
        );
        Ok(sqlx::query_as::<_, QuoteRow>(&sql)
            .bind(author)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_quote(&self, quote_id: Uuid) -> Result<Option<QuoteRow>, StoreError> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q LEFT JOIN users u ON u.id = q.user_id
             WHERE q.id = $1"
        );
        Ok(sqlx::query_as::<_, QuoteRow>(&sql)
            .bind(quote_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_quote(&self, quote: &NewQuote) -> Result<QuoteRow, StoreError> {
        Ok(sqlx::query_as::<_, QuoteRow>(
            r#"
            WITH q AS (
                INSERT INTO quotes (content, author, user_id)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT q.id, q.content, q.author, q.user_id, q.like_count, q.save_count,
                   q.created_at, q.updated_at, u.username, u.full_name, u.avatar_url
            FROM q LEFT JOIN users u ON u.id = q.user_id
            "#,
        )
        .bind(&quote.content)
        .bind(&quote.author)
        .bind(quote.user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn user_interactions(
        &self,
        user_id: Uuid,
        quote_ids: &[Uuid],
        kinds: &[InteractionKind],
    ) -> Result<Vec<InteractionRow>, StoreError> {
        let kinds: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
        Ok(sqlx::query_as::<_, InteractionRow>(
            r#"
            SELECT id, user_id, quote_id, "type", created_at
            FROM interactions
            WHERE user_id = $1 AND quote_id = ANY($2) AND "type" = ANY($3)
            "#,
        )
        .bind(user_id)
        .bind(quote_ids)
        .bind(kinds)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<Option<InteractionRow>, StoreError> {
        Ok(sqlx::query_as::<_, InteractionRow>(
            r#"
            SELECT id, user_id, quote_id, "type", created_at
            FROM interactions
            WHERE user_id = $1 AND quote_id = $2 AND "type" = $3
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(quote_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<InteractionRow, StoreError> {
        Ok(sqlx::query_as::<_, InteractionRow>(
            r#"
            INSERT INTO interactions (user_id, quote_id, "type")
            VALUES ($1, $2, $3)
            RETURNING id, user_id, quote_id, "type", created_at
            "#,
        )
        .bind(user_id)
        .bind(quote_id)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"DELETE FROM interactions WHERE user_id = $1 AND quote_id = $2 AND "type" = $3"#,
        )
        .bind(user_id)
        .bind(quote_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn adjust_counter(
        &self,
        quote_id: Uuid,
        kind: InteractionKind,
        delta: i32,
    ) -> Result<(), StoreError> {
        let sql = match kind {
            InteractionKind::Like => {
                "UPDATE quotes SET like_count = GREATEST(like_count + $2, 0), updated_at = NOW() WHERE id = $1"
            }
            InteractionKind::Save => {
                "UPDATE quotes SET save_count = GREATEST(save_count + $2, 0), updated_at = NOW() WHERE id = $1"
            }
            InteractionKind::Report => return Ok(()),
        };
        sqlx::query(sql)
            .bind(quote_id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn interacted_quotes(
        &self,
        user_id: Uuid,
        kind: InteractionKind,
    ) -> Result<Vec<QuoteRow>, StoreError> {
        let sql = format!(
            r#"SELECT {QUOTE_COLUMNS}
               FROM interactions i
               JOIN quotes q ON q.id = i.quote_id
               LEFT JOIN users u ON u.id = q.user_id
               WHERE i.user_id = $1 AND i."type" = $2
               ORDER BY i.created_at DESC"#
        );
        Ok(sqlx::query_as::<_, QuoteRow>(&sql)
            .bind(user_id)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(
            sqlx::query_as::<_, UserProfile>("SELECT * FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        Ok(
            sqlx::query_as::<_, UserProfile>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<UserProfile, StoreError> {
        Ok(sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO users (id, email, username, full_name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.username)
        .bind(&profile.full_name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn count_quotes_by_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<i64, StoreError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE following_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn count_following(&self, user_id: Uuid) -> Result<i64, StoreError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_needle() {
        assert_eq!(like_pattern("life"), "%life%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_done\\"), "%100\\%\\_done\\\\%");
    }
}
