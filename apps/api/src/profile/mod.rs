//! The signed-in user's profile page.

use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interaction::InteractionKind;
use crate::models::quote::Quote;
use crate::models::user::UserProfile;
use crate::store::{QuoteStore, StoreError};

pub mod handlers;

#[derive(Debug, Serialize)]
pub struct ProfileStats {
    pub profile: Option<UserProfile>,
    pub quotes_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub liked_quotes: Vec<Quote>,
    pub saved_quotes: Vec<Quote>,
}

pub async fn profile_stats(store: &dyn QuoteStore, user_id: Uuid) -> Result<ProfileStats, AppError> {
    collect(store, user_id).await.map_err(|e| {
        error!(%user_id, "Error fetching user stats: {e}");
        AppError::Failed("Failed to load profile data".to_string())
    })
}

async fn collect(store: &dyn QuoteStore, user_id: Uuid) -> Result<ProfileStats, StoreError> {
    let profile = store.find_profile(user_id).await?;
    let quotes_count = store.count_quotes_by_user(user_id).await?;
    let followers_count = store.count_followers(user_id).await?;
    let following_count = store.count_following(user_id).await?;

    // Each list only carries the flag it was selected by.
    let liked_quotes = store
        .interacted_quotes(user_id, InteractionKind::Like)
        .await?
        .into_iter()
        .map(|row| Quote {
            is_liked: true,
            ..Quote::from(row)
        })
        .collect();
    let saved_quotes = store
        .interacted_quotes(user_id, InteractionKind::Save)
        .await?
        .into_iter()
        .map(|row| Quote {
            is_saved: true,
            ..Quote::from(row)
        })
        .collect();

    Ok(ProfileStats {
        profile,
        quotes_count,
        followers_count,
        following_count,
        liked_quotes,
        saved_quotes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::NewQuote;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_profile_stats() {
        let store = MemoryStore::new();
        let me = Uuid::new_v4();
        let friend = Uuid::new_v4();
        store.seed_profile(me, "me@example.com", "me");
        store.seed_follow(friend, me);
        store.seed_follow(me, friend);
        store.seed_follow(Uuid::new_v4(), me);
        store
            .insert_quote(&NewQuote {
                content: "Mine".to_string(),
                author: "Me".to_string(),
                user_id: me,
            })
            .await
            .unwrap();
        let liked = store.seed_quote("liked", "A", 1, 0, 1);
        let saved = store.seed_quote("saved", "B", 0, 1, 1);
        store.insert_interaction(me, liked, InteractionKind::Like).await.unwrap();
        store.insert_interaction(me, saved, InteractionKind::Save).await.unwrap();

        let stats = profile_stats(&store, me).await.unwrap();
        assert_eq!(stats.profile.map(|p| p.username), Some("me".to_string()));
        assert_eq!(stats.quotes_count, 1);
        assert_eq!(stats.followers_count, 2);
        assert_eq!(stats.following_count, 1);
        assert_eq!(stats.liked_quotes.len(), 1);
        assert!(stats.liked_quotes[0].is_liked && !stats.liked_quotes[0].is_saved);
        assert_eq!(stats.saved_quotes[0].id, saved);
        assert!(stats.saved_quotes[0].is_saved);
    }

    #[tokio::test]
    async fn test_failure_has_user_message() {
        let store = MemoryStore::new();
        store.set_fail_reads(true);
        let err = profile_stats(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Failed(msg) if msg == "Failed to load profile data"));
    }
}
