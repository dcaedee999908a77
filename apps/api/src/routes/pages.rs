//! View routes. Each answers with a small descriptor the client renders from.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::auth::flow::AuthMode;
use crate::state::AppState;
use crate::viewer::registry::viewer_id;

#[derive(Debug, Serialize)]
pub struct PageView {
    pub view: &'static str,
    pub title: &'static str,
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_measurement_id: Option<String>,
}

async fn page(
    state: &AppState,
    headers: &HeaderMap,
    view: &'static str,
    title: &'static str,
    auth_mode: Option<AuthMode>,
) -> Json<PageView> {
    let mut signed_in = false;
    if let Some(viewer) = viewer_id(headers).and_then(|id| state.viewers.get(id)) {
        let mut viewer = viewer.lock().await;
        signed_in = viewer.session.is_some();
        if let Some(mode) = auth_mode {
            viewer.auth_flow.switch_mode(mode);
        }
    }
    Json(PageView {
        view,
        title,
        signed_in,
        analytics_measurement_id: state.config.analytics_measurement_id.clone(),
    })
}

/// GET /
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Json<PageView> {
    page(&state, &headers, "home", "Pekikkan - Daily Inspiration", None).await
}

/// GET /explore
pub async fn explore(State(state): State<AppState>, headers: HeaderMap) -> Json<PageView> {
    page(&state, &headers, "explore", "Explore Quotes", None).await
}

/// GET /post (gated)
pub async fn post(State(state): State<AppState>, headers: HeaderMap) -> Json<PageView> {
    page(&state, &headers, "post", "Post Quote - Share Inspiration", None).await
}

/// GET /profile (gated)
pub async fn profile(State(state): State<AppState>, headers: HeaderMap) -> Json<PageView> {
    page(&state, &headers, "profile", "Your Profile", None).await
}

/// GET /login
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Json<PageView> {
    page(&state, &headers, "login", "Sign In", Some(AuthMode::Login)).await
}

/// GET /signup
pub async fn signup(State(state): State<AppState>, headers: HeaderMap) -> Json<PageView> {
    page(&state, &headers, "signup", "Create Account", Some(AuthMode::Signup)).await
}
