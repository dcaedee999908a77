use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::state::AppState;
use crate::viewer::registry::viewer_id;

/// Route gate for signed-in pages. Checked on every request, so a page
/// revisited after sign-out also bounces to `/`.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let viewer = viewer_id(request.headers()).and_then(|id| state.viewers.get(id));
    let signed_in = match viewer {
        Some(viewer) => viewer.lock().await.session.is_some(),
        None => false,
    };
    if !signed_in {
        debug!(path = %request.uri().path(), "No session; redirecting home");
        return Redirect::to("/").into_response();
    }
    next.run(request).await
}
