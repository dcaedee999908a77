use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::auth::Session;
use crate::models::interaction::InteractionKind;
use crate::models::quote::{Quote, QuoteRow};
use crate::store::{QuoteStore, StoreError};

/// Most recent `limit` quotes with the session user's like/save flags set.
pub async fn load_feed(
    store: &dyn QuoteStore,
    session: Option<&Session>,
    limit: i64,
) -> Result<Vec<Quote>, StoreError> {
    let rows = store.recent_quotes(limit).await?;
    decorate(store, session.map(Session::user_id), rows).await
}

/// Converts rows to quotes, marking the ones `user_id` has liked or saved.
pub async fn decorate(
    store: &dyn QuoteStore,
    user_id: Option<Uuid>,
    rows: Vec<QuoteRow>,
) -> Result<Vec<Quote>, StoreError> {
    let mut quotes: Vec<Quote> = rows.into_iter().map(Quote::from).collect();
    let Some(user_id) = user_id else {
        return Ok(quotes);
    };
    if quotes.is_empty() {
        return Ok(quotes);
    }

    let ids: Vec<Uuid> = quotes.iter().map(|q| q.id).collect();
    let rows = store
        .user_interactions(
            user_id,
            &ids,
            &[InteractionKind::Like, InteractionKind::Save],
        )
        .await?;

    let mut liked = HashSet::new();
    let mut saved = HashSet::new();
    for row in rows {
        match row.kind() {
            Some(InteractionKind::Like) => {
                liked.insert(row.quote_id);
            }
            Some(InteractionKind::Save) => {
                saved.insert(row.quote_id);
            }
            _ => {}
        }
    }
    debug!(%user_id, liked = liked.len(), saved = saved.len(), "Merged interaction flags");

    for quote in &mut quotes {
        quote.is_liked = liked.contains(&quote.id);
        quote.is_saved = saved.contains(&quote.id);
    }
    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_anonymous_feed_has_no_flags() {
        let store = MemoryStore::new();
        let id = store.seed_quote("Be yourself; everyone else is already taken.", "Oscar Wilde", 5, 1, 0);
        store
            .insert_interaction(Uuid::new_v4(), id, InteractionKind::Like)
            .await
            .unwrap();
        let quotes = load_feed(&store, None, 20).await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert!(!quotes[0].is_liked && !quotes[0].is_saved);
    }

    #[tokio::test]
    async fn test_decorate_marks_user_rows_only() {
        let store = MemoryStore::new();
        let a = store.seed_quote("a", "A", 0, 0, 1);
        let b = store.seed_quote("b", "B", 0, 0, 0);
        let me = Uuid::new_v4();
        store.insert_interaction(me, a, InteractionKind::Save).await.unwrap();
        store.insert_interaction(me, b, InteractionKind::Report).await.unwrap();
        store
            .insert_interaction(Uuid::new_v4(), b, InteractionKind::Like)
            .await
            .unwrap();

        let rows = store.recent_quotes(20).await.unwrap();
        let quotes = decorate(&store, Some(me), rows).await.unwrap();
        assert_eq!(quotes[0].id, b);
        assert!(!quotes[0].is_liked && !quotes[0].is_saved);
        assert!(quotes[1].is_saved && !quotes[1].is_liked);
    }

    #[tokio::test]
    async fn test_feed_limit_and_order() {
        let store = MemoryStore::new();
        for age in 0..5 {
            store.seed_quote(&format!("q{age}"), "Anon", 0, 0, age);
        }
        let quotes = load_feed(&store, None, 3).await.unwrap();
        let contents: Vec<&str> = quotes.iter().map(|q| q.content.as_str()).collect();
        assert_eq!(contents, ["q0", "q1", "q2"]);
    }
}
