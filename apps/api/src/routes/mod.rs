pub mod health;
pub mod pages;

use axum::{
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};

use crate::auth::{guard::require_session, handlers as auth};
use crate::explore::handlers as explore;
use crate::feed::handlers as feed;
use crate::post::handlers as posting;
use crate::profile::handlers as profile;
use crate::report::handlers as report;
use crate::state::AppState;
use crate::viewer::handlers as viewer;
use crate::voice::handlers as voice;

pub fn build_router(state: AppState) -> Router {
    let gated_pages = Router::new()
        .route("/post", get(pages::post))
        .route("/profile", get(pages::profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        // View routes
        .route("/", get(pages::home))
        .route("/explore", get(pages::explore))
        .route("/login", get(pages::login))
        .route("/signup", get(pages::signup))
        .merge(gated_pages)
        // Viewers
        .route("/api/v1/viewers", post(viewer::handle_create_viewer))
        .route("/api/v1/notifications", get(viewer::handle_notifications))
        // Auth
        .route("/api/v1/auth", get(auth::handle_auth_status))
        .route("/api/v1/auth/mode", post(auth::handle_switch_mode))
        .route("/api/v1/auth/signup", post(auth::handle_sign_up))
        .route("/api/v1/auth/login", post(auth::handle_sign_in))
        .route("/api/v1/auth/logout", post(auth::handle_sign_out))
        .route("/api/v1/auth/refresh", post(auth::handle_refresh))
        // Feed
        .route("/api/v1/feed", get(feed::handle_get_feed))
        .route("/api/v1/feed/refresh", post(feed::handle_refresh_feed))
        .route("/api/v1/feed/navigate", post(feed::handle_navigate))
        .route("/api/v1/feed/key", post(feed::handle_key))
        .route("/api/v1/feed/gesture", post(feed::handle_gesture))
        // Quotes
        .route("/api/v1/quotes", post(posting::handle_post_quote))
        .route("/api/v1/quotes/:id/like", post(feed::handle_like))
        .route("/api/v1/quotes/:id/save", post(feed::handle_save))
        .route("/api/v1/quotes/:id/report", post(report::handle_report))
        .route("/api/v1/quotes/:id/speech", post(voice::handle_speech))
        // Explore
        .route("/api/v1/explore", get(explore::handle_overview))
        .route(
            "/api/v1/explore/search",
            get(explore::handle_get_search).post(explore::handle_set_search),
        )
        .route(
            "/api/v1/explore/categories/:name",
            get(explore::handle_category),
        )
        .route("/api/v1/explore/authors/:name", get(explore::handle_author))
        // Profile and voice
        .route("/api/v1/profile", get(profile::handle_profile))
        .route("/api/v1/voice/status", get(voice::handle_voice_status))
        .fallback(|| async { Redirect::to("/") })
        .with_state(state)
}
