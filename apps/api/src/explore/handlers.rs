use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::AppError;
use crate::explore::categories::{find_category, Category, CATEGORIES};
use crate::explore::scoring::{PopularAuthor, TrendingQuote};
use crate::explore::search::SearchView;
use crate::explore::service;
use crate::models::quote::Quote;
use crate::state::AppState;
use crate::viewer::{ViewerHandle, ViewerSnapshot};

#[derive(Serialize)]
pub struct ExploreOverview {
    pub trending: Vec<TrendingQuote>,
    pub popular_authors: Vec<PopularAuthor>,
    pub categories: &'static [Category],
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// GET /api/v1/explore
///
/// Each section degrades to an empty list on its own; the failure is raised as a toast.
pub async fn handle_overview(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
) -> Json<ExploreOverview> {
    let ViewerSnapshot { user_id, notifier } = viewer.lock().await.snapshot();

    let trending = match service::trending(state.store.as_ref(), user_id, Utc::now()).await {
        Ok(quotes) => quotes,
        Err(e) => {
            error!("Error fetching trending quotes: {e}");
            notifier.error("Failed to load trending quotes");
            Vec::new()
        }
    };
    let popular_authors = match service::authors(state.store.as_ref()).await {
        Ok(authors) => authors,
        Err(e) => {
            error!("Error fetching popular authors: {e}");
            notifier.error("Failed to load popular authors");
            Vec::new()
        }
    };

    Json(ExploreOverview {
        trending,
        popular_authors,
        categories: CATEGORIES,
    })
}

/// POST /api/v1/explore/search
pub async fn handle_set_search(
    ViewerHandle(viewer): ViewerHandle,
    Json(req): Json<SearchRequest>,
) -> Json<SearchView> {
    let mut viewer = viewer.lock().await;
    let user_id = viewer.user_id();
    viewer.search.set_query(&req.query, user_id);
    Json(viewer.search.view())
}

/// GET /api/v1/explore/search
pub async fn handle_get_search(ViewerHandle(viewer): ViewerHandle) -> Json<SearchView> {
    let viewer = viewer.lock().await;
    Json(viewer.search.view())
}

/// GET /api/v1/explore/categories/:name
pub async fn handle_category(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
    Path(name): Path<String>,
) -> Result<Json<Vec<Quote>>, AppError> {
    let category =
        find_category(&name).ok_or_else(|| AppError::NotFound(format!("Category {name} not found")))?;
    let ViewerSnapshot { user_id, notifier } = viewer.lock().await.snapshot();
    match service::by_category(state.store.as_ref(), category, user_id).await {
        Ok(quotes) => Ok(Json(quotes)),
        Err(e) => {
            error!(category = category.name, "Error fetching category quotes: {e}");
            notifier.error(format!("Failed to load {} quotes", category.name));
            Err(e.into())
        }
    }
}

/// GET /api/v1/explore/authors/:name
pub async fn handle_author(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
    Path(name): Path<String>,
) -> Result<Json<Vec<Quote>>, AppError> {
    let ViewerSnapshot { user_id, notifier } = viewer.lock().await.snapshot();
    match service::by_author(state.store.as_ref(), &name, user_id).await {
        Ok(quotes) => Ok(Json(quotes)),
        Err(e) => {
            error!(author = %name, "Error fetching author quotes: {e}");
            notifier.error(format!("Failed to load quotes by {name}"));
            Err(e.into())
        }
    }
}
