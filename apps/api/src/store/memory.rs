//! In-memory `QuoteStore` for service and router tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use uuid::Uuid;

use crate::models::interaction::{InteractionKind, InteractionRow};
use crate::models::quote::{NewQuote, QuoteRow};
use crate::models::user::{NewProfile, UserProfile};
use crate::store::{QuoteStore, StoreError};

#[derive(Default)]
struct Tables {
    quotes: Vec<QuoteRow>,
    interactions: Vec<InteractionRow>,
    users: Vec<UserProfile>,
    follows: Vec<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    failing_inserts: AtomicUsize,
    failing_counter_updates: AtomicUsize,
    trending_gate: Arc<RwLock<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a quote created `age_days` ago and returns its id.
    pub fn seed_quote(&self, content: &str, author: &str, likes: i32, saves: i32, age_days: i64) -> Uuid {
        let created_at = Utc::now() - Duration::days(age_days);
        let row = QuoteRow {
            id: Uuid::new_v4(),
            content: content.to_string(),
            author: author.to_string(),
            user_id: Uuid::new_v4(),
            like_count: likes,
            save_count: saves,
            created_at,
            updated_at: created_at,
            username: None,
            full_name: None,
            avatar_url: None,
        };
        let id = row.id;
        self.tables.lock().quotes.push(row);
        id
    }

    pub fn seed_profile(&self, id: Uuid, email: &str, username: &str) {
        let now = Utc::now();
        self.tables.lock().users.push(UserProfile {
            id,
            email: email.to_string(),
            username: username.to_string(),
            full_name: String::new(),
            avatar_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn seed_follow(&self, follower_id: Uuid, following_id: Uuid) {
        self.tables.lock().follows.push((follower_id, following_id));
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Holds `quotes_since` calls until the returned guard is dropped.
    pub async fn stall_trending(&self) -> OwnedRwLockWriteGuard<()> {
        Arc::clone(&self.trending_gate).write_owned().await
    }

    /// Fails the next `n` interaction inserts, then recovers.
    pub fn fail_next_inserts(&self, n: usize) {
        self.failing_inserts.store(n, Ordering::SeqCst);
    }

    /// Fails the next `n` counter updates, then recovers.
    pub fn fail_next_counter_updates(&self, n: usize) {
        self.failing_counter_updates.store(n, Ordering::SeqCst);
    }

    pub fn quote(&self, quote_id: Uuid) -> Option<QuoteRow> {
        self.tables.lock().quotes.iter().find(|q| q.id == quote_id).cloned()
    }

    pub fn interaction_count(&self, quote_id: Uuid, kind: InteractionKind) -> usize {
        self.tables
            .lock()
            .interactions
            .iter()
            .filter(|i| i.quote_id == quote_id && i.kind == kind.as_str())
            .count()
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn take_failure(budget: &AtomicUsize, what: &str) -> Result<(), StoreError> {
        let armed = budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(StoreError::Unavailable(format!("{what} failed")));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn by_likes(mut rows: Vec<QuoteRow>, limit: i64) -> Vec<QuoteRow> {
        rows.sort_by(|a, b| b.like_count.cmp(&a.like_count));
        rows.truncate(limit.max(0) as usize);
        rows
    }
}

#[async_trait]
impl QuoteStore for MemoryStore {
    async fn recent_quotes(&self, limit: i64) -> Result<Vec<QuoteRow>, StoreError> {
        self.check_read()?;
        let mut rows = self.tables.lock().quotes.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn quotes_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<QuoteRow>, StoreError> {
        let _open = self.trending_gate.read().await;
        self.check_read()?;
        let rows = self
            .tables
            .lock()
            .quotes
            .iter()
            .filter(|q| q.created_at >= since)
            .cloned()
            .collect();
        Ok(Self::by_likes(rows, limit))
    }

    async fn all_quotes(&self) -> Result<Vec<QuoteRow>, StoreError> {
        self.check_read()?;
        let rows = self.tables.lock().quotes.clone();
        Ok(Self::by_likes(rows, i64::MAX))
    }

    async fn search_quotes(&self, needle: &str, limit: i64) -> Result<Vec<QuoteRow>, StoreError> {
        self.check_read()?;
        let needle = needle.to_lowercase();
        let rows = self
            .tables
            .lock()
            .quotes
            .iter()
            .filter(|q| {
                q.content.to_lowercase().contains(&needle)
                    || q.author.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(Self::by_likes(rows, limit))
    }

    async fn quotes_with_any_keyword(
        &self,
        keywords: &[&str],
        limit: i64,
    ) -> Result<Vec<QuoteRow>, StoreError> {
        self.check_read()?;
        let rows = self
            .tables
            .lock()
            .quotes
            .iter()
            .filter(|q| {
                let content = q.content.to_lowercase();
                keywords.iter().any(|k| content.contains(&k.to_lowercase()))
            })
            .cloned()
            .collect();
        Ok(Self::by_likes(rows, limit))
    }

    async fn quotes_by_author(
        &self,
        author: &str,
        limit: i64,
    ) -> Result<Vec<QuoteRow>, StoreError> {
        self.check_read()?;
        let rows = self
            .tables
            .lock()
            .quotes
            .iter()
            .filter(|q| q.author == author)
            .cloned()
            .collect();
        Ok(Self::by_likes(rows, limit))
    }

    async fn find_quote(&self, quote_id: Uuid) -> Result<Option<QuoteRow>, StoreError> {
        self.check_read()?;
        Ok(self.quote(quote_id))
    }

    async fn insert_quote(&self, quote: &NewQuote) -> Result<QuoteRow, StoreError> {
        self.check_write()?;
        let now = Utc::now();
        let mut tables = self.tables.lock();
        let poster = tables.users.iter().find(|u| u.id == quote.user_id).cloned();
        let row = QuoteRow {
            id: Uuid::new_v4(),
            content: quote.content.clone(),
            author: quote.author.clone(),
            user_id: quote.user_id,
            like_count: 0,
            save_count: 0,
            created_at: now,
            updated_at: now,
            username: poster.as_ref().map(|p| p.username.clone()),
            full_name: poster.as_ref().map(|p| p.full_name.clone()),
            avatar_url: poster.and_then(|p| p.avatar_url),
        };
        tables.quotes.push(row.clone());
        Ok(row)
    }

    async fn user_interactions(
        &self,
        user_id: Uuid,
        quote_ids: &[Uuid],
        kinds: &[InteractionKind],
    ) -> Result<Vec<InteractionRow>, StoreError> {
        self.check_read()?;
        Ok(self
            .tables
            .lock()
            .interactions
            .iter()
            .filter(|i| {
                i.user_id == user_id
                    && quote_ids.contains(&i.quote_id)
                    && i.kind().is_some_and(|k| kinds.contains(&k))
            })
            .cloned()
            .collect())
    }

    async fn find_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<Option<InteractionRow>, StoreError> {
        self.check_read()?;
        Ok(self
            .tables
            .lock()
            .interactions
            .iter()
            .find(|i| i.user_id == user_id && i.quote_id == quote_id && i.kind == kind.as_str())
            .cloned())
    }

    async fn insert_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<InteractionRow, StoreError> {
        self.check_write()?;
        Self::take_failure(&self.failing_inserts, "insert")?;
        let row = InteractionRow {
            id: Uuid::new_v4(),
            user_id,
            quote_id,
            kind: kind.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().interactions.push(row.clone());
        Ok(row)
    }

    async fn delete_interaction(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        kind: InteractionKind,
    ) -> Result<u64, StoreError> {
        self.check_write()?;
        let mut tables = self.tables.lock();
        let before = tables.interactions.len();
        tables.interactions.retain(|i| {
            !(i.user_id == user_id && i.quote_id == quote_id && i.kind == kind.as_str())
        });
        Ok((before - tables.interactions.len()) as u64)
    }

    async fn adjust_counter(
        &self,
        quote_id: Uuid,
        kind: InteractionKind,
        delta: i32,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        Self::take_failure(&self.failing_counter_updates, "counter update")?;
        let mut tables = self.tables.lock();
        if let Some(q) = tables.quotes.iter_mut().find(|q| q.id == quote_id) {
            match kind {
                InteractionKind::Like => q.like_count = (q.like_count + delta).max(0),
                InteractionKind::Save => q.save_count = (q.save_count + delta).max(0),
                InteractionKind::Report => {}
            }
        }
        Ok(())
    }

    async fn interacted_quotes(
        &self,
        user_id: Uuid,
        kind: InteractionKind,
    ) -> Result<Vec<QuoteRow>, StoreError> {
        self.check_read()?;
        let tables = self.tables.lock();
        let mut hits: Vec<&InteractionRow> = tables
            .interactions
            .iter()
            .filter(|i| i.user_id == user_id && i.kind == kind.as_str())
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hits
            .into_iter()
            .filter_map(|i| tables.quotes.iter().find(|q| q.id == i.quote_id).cloned())
            .collect())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        self.check_read()?;
        Ok(self.tables.lock().users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        self.check_read()?;
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<UserProfile, StoreError> {
        self.check_write()?;
        let now = Utc::now();
        let row = UserProfile {
            id: profile.id,
            email: profile.email.clone(),
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            avatar_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().users.push(row.clone());
        Ok(row)
    }

    async fn count_quotes_by_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        self.check_read()?;
        Ok(self.tables.lock().quotes.iter().filter(|q| q.user_id == user_id).count() as i64)
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<i64, StoreError> {
        self.check_read()?;
        Ok(self.tables.lock().follows.iter().filter(|(_, to)| *to == user_id).count() as i64)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<i64, StoreError> {
        self.check_read()?;
        Ok(self.tables.lock().follows.iter().filter(|(from, _)| *from == user_id).count() as i64)
    }
}
