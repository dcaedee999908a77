use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::interaction::ToggleKind;

/// A `quotes` row with the owning user's profile columns LEFT JOINed in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuoteRow {
    pub id: Uuid,
    pub content: String,
    pub author: String,
    pub user_id: Uuid,
    pub like_count: i32,
    pub save_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterProfile {
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

/// A quote as presented to a viewer. `is_liked` / `is_saved` are derived from
/// the signed-in user's interaction rows and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub content: String,
    pub author: String,
    pub user_id: Uuid,
    pub like_count: i32,
    pub save_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<PosterProfile>,
    pub is_liked: bool,
    pub is_saved: bool,
}

impl Quote {
    pub fn flag(&self, kind: ToggleKind) -> bool {
        match kind {
            ToggleKind::Like => self.is_liked,
            ToggleKind::Save => self.is_saved,
        }
    }

    /// Sets the flag and moves the matching counter by `delta`, floored at zero.
    pub(crate) fn set_interaction(&mut self, kind: ToggleKind, flag: bool, delta: i32) {
        let (slot, count) = match kind {
            ToggleKind::Like => (&mut self.is_liked, &mut self.like_count),
            ToggleKind::Save => (&mut self.is_saved, &mut self.save_count),
        };
        *slot = flag;
        *count = (*count + delta).max(0);
    }
}

impl From<QuoteRow> for Quote {
    fn from(row: QuoteRow) -> Self {
        let user = row.username.map(|username| PosterProfile {
            username,
            full_name: row.full_name.unwrap_or_default(),
            avatar_url: row.avatar_url,
        });
        Quote {
            id: row.id,
            content: row.content,
            author: row.author,
            user_id: row.user_id,
            like_count: row.like_count,
            save_count: row.save_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user,
            is_liked: false,
            is_saved: false,
        }
    }
}

/// Insert payload for the `quotes` table. Counters start at zero.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub content: String,
    pub author: String,
    pub user_id: Uuid,
}
