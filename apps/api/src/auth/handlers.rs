use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::auth::flow::{AuthFlow, AuthForm, AuthMode, FlowStep};
use crate::auth::service::{self, SIGN_UP_SUCCESS};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::viewer::{FeedView, PendingAction, Viewer, ViewerHandle};

#[derive(Serialize)]
pub struct AuthStatus {
    pub signed_in: bool,
    pub user: Option<AuthUser>,
    pub flow: AuthFlow,
}

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: AuthMode,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub message: &'static str,
    pub steps: Vec<FlowStep>,
    pub flow: AuthFlow,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub user: AuthUser,
    pub feed: FeedView,
    /// The gated action the user tried before signing in. Like and save are
    /// already replayed; a report is handed back for the client to reopen.
    pub resumed: Option<PendingAction>,
}

fn status_of(viewer: &Viewer) -> AuthStatus {
    AuthStatus {
        signed_in: viewer.session.is_some(),
        user: viewer.session.as_ref().map(|s| s.user().clone()),
        flow: viewer.auth_flow.clone(),
    }
}

async fn reload_or_notify(state: &AppState, viewer: &mut Viewer) {
    if let Err(e) = viewer
        .reload_feed(state.store.as_ref(), state.config.feed_page_size)
        .await
    {
        error!(viewer_id = %viewer.id, "Error fetching quotes: {e}");
        viewer.notifier.error("Failed to load quotes");
    }
}

/// GET /api/v1/auth
pub async fn handle_auth_status(ViewerHandle(viewer): ViewerHandle) -> Json<AuthStatus> {
    let viewer = viewer.lock().await;
    Json(status_of(&viewer))
}

/// POST /api/v1/auth/mode
pub async fn handle_switch_mode(
    ViewerHandle(viewer): ViewerHandle,
    Json(req): Json<ModeRequest>,
) -> Json<AuthStatus> {
    let mut viewer = viewer.lock().await;
    viewer.auth_flow.switch_mode(req.mode);
    Json(status_of(&viewer))
}

/// POST /api/v1/auth/signup
///
/// A new account is not signed in. The response carries the timed steps that
/// walk the form back to login with the email filled in.
pub async fn handle_sign_up(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
    Json(form): Json<AuthForm>,
) -> Result<Json<SignUpResponse>, AppError> {
    let mut viewer = viewer.lock().await;
    if viewer.auth_flow.mode != AuthMode::Signup {
        viewer.auth_flow.switch_mode(AuthMode::Signup);
    }
    viewer
        .auth_flow
        .begin_submit(&form)
        .map_err(AppError::Validation)?;

    match service::sign_up(state.store.as_ref(), state.auth.as_ref(), &form).await {
        Ok(outcome) => {
            let steps = viewer.auth_flow.succeed_signup(&form.email);
            viewer.auth_flow.finish_sequence();
            viewer.notifier.success(SIGN_UP_SUCCESS);
            debug!(user_id = %outcome.user_id, "Sign-up sequence scheduled");
            Ok(Json(SignUpResponse {
                message: outcome.message,
                steps,
                flow: viewer.auth_flow.clone(),
            }))
        }
        Err(e) => {
            let message = user_text(&e);
            viewer.auth_flow.fail(message.clone());
            viewer.notifier.error(message);
            Err(e)
        }
    }
}

/// POST /api/v1/auth/login
pub async fn handle_sign_in(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
    Json(form): Json<AuthForm>,
) -> Result<Json<SignInResponse>, AppError> {
    let mut viewer = viewer.lock().await;
    if viewer.auth_flow.mode != AuthMode::Login {
        viewer.auth_flow.switch_mode(AuthMode::Login);
    }
    viewer
        .auth_flow
        .begin_submit(&form)
        .map_err(AppError::Validation)?;

    let session = match service::sign_in(state.store.as_ref(), state.auth.as_ref(), &form).await {
        Ok(session) => session,
        Err(e) => {
            let message = user_text(&e);
            viewer.auth_flow.fail(message.clone());
            viewer.notifier.error(message);
            return Err(e);
        }
    };

    let user = session.user().clone();
    viewer.auth_flow.succeed_login();
    viewer.sign_in(session);
    viewer.notifier.success("Signed in successfully!");
    reload_or_notify(&state, &mut viewer).await;

    let resumed = viewer.take_pending();
    if let Some(pending) = resumed {
        if let Some(kind) = pending.action.toggle_kind() {
            // The reloaded flags decide the direction; an already-liked quote stays liked.
            let already = viewer.feed.lock().flag(pending.quote_id, kind);
            if already == Some(false) {
                if let Err(e) = viewer.toggle(pending.quote_id, kind) {
                    warn!(quote_id = %pending.quote_id, "Could not resume {:?}: {e}", pending.action);
                }
            }
        }
    }

    Ok(Json(SignInResponse {
        user,
        feed: viewer.feed_view(Instant::now()),
        resumed,
    }))
}

/// POST /api/v1/auth/logout
///
/// Queued like/save writes settle first. Local state is torn down even when
/// the auth service rejects the sign-out.
pub async fn handle_sign_out(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
) -> Json<FeedView> {
    let mut viewer = viewer.lock().await;
    viewer.settle().await;
    if let Some(session) = viewer.session.as_ref() {
        match service::sign_out(state.auth.as_ref(), session).await {
            Ok(()) => viewer.notifier.success("Successfully logged out!"),
            Err(e) => viewer.notifier.error(user_text(&e)),
        }
    }
    viewer.sign_out_locally();
    reload_or_notify(&state, &mut viewer).await;
    Json(viewer.feed_view(Instant::now()))
}

/// POST /api/v1/auth/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    ViewerHandle(viewer): ViewerHandle,
) -> Result<Json<AuthStatus>, AppError> {
    let mut viewer = viewer.lock().await;
    let Some(session) = viewer.session.as_mut() else {
        return Err(AppError::Unauthorized("Please sign in".to_string()));
    };
    if let Err(e) = service::refresh_if_needed(state.auth.as_ref(), session).await {
        viewer.notifier.error(user_text(&e));
        viewer.sign_out_locally();
        reload_or_notify(&state, &mut viewer).await;
        return Err(e);
    }
    Ok(Json(status_of(&viewer)))
}

fn user_text(e: &AppError) -> String {
    match e {
        AppError::Validation(m) | AppError::Auth(m) | AppError::Conflict(m) => m.clone(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}
