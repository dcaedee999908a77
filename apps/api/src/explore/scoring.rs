use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::quote::Quote;

pub const TRENDING_WINDOW_DAYS: i64 = 7;
pub const TRENDING_FETCH_LIMIT: i64 = 10;
pub const POPULAR_AUTHOR_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct TrendingQuote {
    #[serde(flatten)]
    pub quote: Quote,
    pub trending_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularAuthor {
    pub author: String,
    pub quote_count: i64,
    pub total_likes: i64,
    pub total_saves: i64,
    pub recent_quote: Option<Quote>,
}

impl PopularAuthor {
    pub fn score(&self) -> i64 {
        self.total_likes * 2 + self.total_saves * 3 + self.quote_count
    }
}

/// (likes*2 + saves*3) divided by whole days since creation, at least one.
pub fn trending_score(like_count: i32, save_count: i32, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days = (now - created_at).num_days().max(1);
    (like_count as f64 * 2.0 + save_count as f64 * 3.0) / days as f64
}

/// Scores and sorts quotes by trending score, highest first.
pub fn rank_trending(quotes: Vec<Quote>, now: DateTime<Utc>) -> Vec<TrendingQuote> {
    let mut ranked: Vec<TrendingQuote> = quotes
        .into_iter()
        .map(|quote| {
            let trending_score =
                trending_score(quote.like_count, quote.save_count, quote.created_at, now);
            TrendingQuote {
                quote,
                trending_score,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.trending_score.total_cmp(&a.trending_score));
    ranked
}

/// Groups by exact author string and returns the top authors by popularity.
pub fn popular_authors(quotes: &[Quote]) -> Vec<PopularAuthor> {
    let mut by_author: HashMap<&str, PopularAuthor> = HashMap::new();
    for quote in quotes {
        let entry = by_author
            .entry(quote.author.as_str())
            .or_insert_with(|| PopularAuthor {
                author: quote.author.clone(),
                quote_count: 0,
                total_likes: 0,
                total_saves: 0,
                recent_quote: None,
            });
        entry.quote_count += 1;
        entry.total_likes += i64::from(quote.like_count);
        entry.total_saves += i64::from(quote.save_count);
        let newer = entry
            .recent_quote
            .as_ref()
            .map_or(true, |r| quote.created_at > r.created_at);
        if newer {
            entry.recent_quote = Some(quote.clone());
        }
    }

    let mut authors: Vec<PopularAuthor> = by_author.into_values().collect();
    authors.sort_by(|a, b| b.score().cmp(&a.score()).then_with(|| a.author.cmp(&b.author)));
    authors.truncate(POPULAR_AUTHOR_LIMIT);
    authors
}
