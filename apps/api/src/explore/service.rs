use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::explore::categories::Category;
use crate::explore::scoring::{
    popular_authors, rank_trending, PopularAuthor, TrendingQuote, TRENDING_FETCH_LIMIT,
    TRENDING_WINDOW_DAYS,
};
use crate::feed::loader::decorate;
use crate::models::quote::Quote;
use crate::store::{QuoteStore, StoreError};

pub const BROWSE_LIMIT: i64 = 20;

/// The most liked quotes of the last week, ranked by trending score.
pub async fn trending(
    store: &dyn QuoteStore,
    user_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Vec<TrendingQuote>, StoreError> {
    let since = now - Duration::days(TRENDING_WINDOW_DAYS);
    let rows = store.quotes_since(since, TRENDING_FETCH_LIMIT).await?;
    let quotes = decorate(store, user_id, rows).await?;
    Ok(rank_trending(quotes, now))
}

pub async fn authors(store: &dyn QuoteStore) -> Result<Vec<PopularAuthor>, StoreError> {
    let quotes: Vec<Quote> = store
        .all_quotes()
        .await?
        .into_iter()
        .map(Quote::from)
        .collect();
    Ok(popular_authors(&quotes))
}

pub async fn by_category(
    store: &dyn QuoteStore,
    category: &Category,
    user_id: Option<Uuid>,
) -> Result<Vec<Quote>, StoreError> {
    let rows = store
        .quotes_with_any_keyword(category.keywords, BROWSE_LIMIT)
        .await?;
    decorate(store, user_id, rows).await
}

pub async fn by_author(
    store: &dyn QuoteStore,
    author: &str,
    user_id: Option<Uuid>,
) -> Result<Vec<Quote>, StoreError> {
    let rows = store.quotes_by_author(author, BROWSE_LIMIT).await?;
    decorate(store, user_id, rows).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explore::categories::find_category;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_trending_skips_old_quotes() {
        let store = MemoryStore::new();
        let fresh = store.seed_quote("fresh", "A", 10, 5, 0);
        store.seed_quote("ancient", "B", 500, 90, 30);
        let week_old = store.seed_quote("older", "C", 50, 0, 5);

        let ranked = trending(&store, None, Utc::now()).await.unwrap();
        let ids: Vec<Uuid> = ranked.iter().map(|t| t.quote.id).collect();
        assert_eq!(ids, vec![fresh, week_old]);
        assert_eq!(ranked[0].trending_score, 35.0);
        assert_eq!(ranked[1].trending_score, 20.0);
    }

    #[tokio::test]
    async fn test_category_matches_keywords() {
        let store = MemoryStore::new();
        store.seed_quote("Gratitude turns what we have into enough.", "Anon", 3, 0, 1);
        store.seed_quote("Knowledge speaks, but wisdom listens.", "Jimi Hendrix", 8, 0, 1);
        let happiness = find_category("Happiness").unwrap();
        let quotes = by_category(&store, happiness, None).await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert!(quotes[0].content.starts_with("Gratitude"));
    }

    #[tokio::test]
    async fn test_author_is_exact_match() {
        let store = MemoryStore::new();
        store.seed_quote("a", "Lao Tzu", 1, 0, 1);
        store.seed_quote("b", "lao tzu", 1, 0, 1);
        assert_eq!(by_author(&store, "Lao Tzu", None).await.unwrap().len(), 1);
    }
}
