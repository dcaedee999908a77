use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::auth::errors::{map_sign_in_error, map_sign_up_error};
use crate::auth::flow::{normalize_username, AuthForm, AuthMode};
use crate::auth::{AuthProvider, Session, UserMetadata};
use crate::errors::AppError;
use crate::models::user::NewProfile;
use crate::store::QuoteStore;

pub const SIGN_UP_SUCCESS: &str =
    "Account created successfully! Please check your email to confirm your account.";
const PROFILE_CREATE_FAILED: &str = "Failed to create user profile. Please try again.";
const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

#[derive(Debug, Serialize)]
pub struct SignUpOutcome {
    pub user_id: uuid::Uuid,
    pub message: &'static str,
}

/// Creates the auth account and the matching `users` row.
///
/// The username pre-check is a read-then-write; two concurrent sign-ups with the
/// same username can both pass it.
pub async fn sign_up(
    store: &dyn QuoteStore,
    auth: &dyn AuthProvider,
    form: &AuthForm,
) -> Result<SignUpOutcome, AppError> {
    form.validate(AuthMode::Signup).map_err(AppError::Validation)?;

    let email = form.email.trim();
    let username = normalize_username(&form.username);
    let full_name = form.full_name.trim().to_string();

    if store.find_profile_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict(map_sign_up_error(
            "Username is already taken",
        )));
    }

    let metadata = UserMetadata {
        username: Some(username.clone()),
        full_name: Some(full_name.clone()),
    };
    let created = auth
        .sign_up(email, &form.password, &metadata)
        .await
        .map_err(|e| AppError::Auth(map_sign_up_error(&e.message())))?;

    let profile = NewProfile {
        id: created.user.id,
        email: created.user.email.clone().unwrap_or_else(|| email.to_string()),
        username,
        full_name,
    };
    if let Err(e) = store.insert_profile(&profile).await {
        error!(user_id = %created.user.id, "Profile creation failed: {e}");
        if let Some(grant) = &created.grant {
            if let Err(e) = auth.sign_out(&grant.access_token).await {
                warn!("Sign-out after failed profile creation also failed: {e}");
            }
        }
        return Err(AppError::Auth(PROFILE_CREATE_FAILED.to_string()));
    }

    info!(user_id = %created.user.id, "Account created");
    Ok(SignUpOutcome {
        user_id: created.user.id,
        message: SIGN_UP_SUCCESS,
    })
}

/// Signs in and makes sure a `users` row exists for the account.
pub async fn sign_in(
    store: &dyn QuoteStore,
    auth: &dyn AuthProvider,
    form: &AuthForm,
) -> Result<Session, AppError> {
    form.validate(AuthMode::Login).map_err(AppError::Validation)?;

    let grant = auth
        .sign_in(form.email.trim(), &form.password)
        .await
        .map_err(|e| AppError::Auth(map_sign_in_error(&e.message())))?;
    let session = Session::from_grant(grant, Utc::now());

    if store.find_profile(session.user_id()).await?.is_none() {
        let user = session.user();
        let email = user.email.clone().unwrap_or_default();
        let username = user
            .user_metadata
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let profile = NewProfile {
            id: user.id,
            email,
            username,
            full_name: user.user_metadata.full_name.clone().unwrap_or_default(),
        };
        // A missing profile does not block sign-in.
        if let Err(e) = store.insert_profile(&profile).await {
            error!(user_id = %user.id, "Failed to create user profile: {e}");
        }
    }

    info!(user_id = %session.user_id(), "Signed in");
    Ok(session)
}

/// Revokes the session upstream. Callers tear down local state whatever the outcome.
pub async fn sign_out(auth: &dyn AuthProvider, session: &Session) -> Result<(), AppError> {
    auth.sign_out(session.access_token()).await.map_err(|e| {
        warn!(user_id = %session.user_id(), "Upstream sign-out failed: {e}");
        AppError::Auth(e.message())
    })?;
    info!(user_id = %session.user_id(), "Signed out");
    Ok(())
}

/// Rotates tokens when the session is close to expiry. Returns whether they changed.
pub async fn refresh_if_needed(
    auth: &dyn AuthProvider,
    session: &mut Session,
) -> Result<bool, AppError> {
    let now = Utc::now();
    if !session.needs_refresh(now) {
        return Ok(false);
    }
    let grant = auth.refresh(session.refresh_token()).await.map_err(|e| {
        warn!(user_id = %session.user_id(), "Token refresh failed: {e}");
        AppError::Auth(SESSION_EXPIRED.to_string())
    })?;
    session.apply_refresh(grant, now);
    info!(user_id = %session.user_id(), "Session refreshed");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::stub::StubAuth;
    use crate::store::memory::MemoryStore;
    use uuid::Uuid;

    fn signup_form(email: &str, username: &str) -> AuthForm {
        AuthForm {
            email: email.to_string(),
            password: "secret1".to_string(),
            username: username.to_string(),
            full_name: "Maya Angelou".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile() {
        let store = MemoryStore::new();
        let auth = StubAuth::new();
        let outcome = sign_up(&store, &auth, &signup_form("maya@example.com", "Maya"))
            .await
            .unwrap();
        let profile = store.find_profile(outcome.user_id).await.unwrap().unwrap();
        assert_eq!(profile.username, "maya");
    }

    #[tokio::test]
    async fn test_sign_up_rejects_taken_username() {
        let store = MemoryStore::new();
        store.seed_profile(Uuid::new_v4(), "other@example.com", "maya");
        let auth = StubAuth::new();
        let err = sign_up(&store, &auth, &signup_form("maya@example.com", "maya"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Username is already taken"));
    }

    #[tokio::test]
    async fn test_sign_up_maps_duplicate_email() {
        let store = MemoryStore::new();
        let auth = StubAuth::new();
        auth.register("maya@example.com", "secret1", None);
        let err = sign_up(&store, &auth, &signup_form("maya@example.com", "maya"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Auth(msg) if msg == "An account with this email already exists")
        );
    }

    #[tokio::test]
    async fn test_sign_up_profile_failure_reported() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let auth = StubAuth::new();
        let err = sign_up(&store, &auth, &signup_form("maya@example.com", "maya"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(msg) if msg == PROFILE_CREATE_FAILED));
    }

    #[tokio::test]
    async fn test_sign_in_backfills_missing_profile() {
        let store = MemoryStore::new();
        let auth = StubAuth::new();
        let user_id = auth.register("sam@example.com", "secret1", None);
        let form = AuthForm {
            email: "sam@example.com".to_string(),
            password: "secret1".to_string(),
            ..Default::default()
        };
        let session = sign_in(&store, &auth, &form).await.unwrap();
        assert_eq!(session.user_id(), user_id);
        let profile = store.find_profile(user_id).await.unwrap().unwrap();
        assert_eq!(profile.username, "sam");
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password_mapped() {
        let store = MemoryStore::new();
        let auth = StubAuth::new();
        auth.register("sam@example.com", "secret1", None);
        let form = AuthForm {
            email: "sam@example.com".to_string(),
            password: "wrong-one".to_string(),
            ..Default::default()
        };
        let err = sign_in(&store, &auth, &form).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(msg) if msg.starts_with("Invalid email or password")));
    }

    #[tokio::test]
    async fn test_refresh_rotates_expiring_session() {
        let store = MemoryStore::new();
        let auth = StubAuth::with_expiry(30);
        auth.register("sam@example.com", "secret1", Some("sam"));
        let form = AuthForm {
            email: "sam@example.com".to_string(),
            password: "secret1".to_string(),
            ..Default::default()
        };
        let mut session = sign_in(&store, &auth, &form).await.unwrap();
        let old_token = session.access_token().to_string();
        assert!(refresh_if_needed(&auth, &mut session).await.unwrap());
        assert_ne!(session.access_token(), old_token);
    }
}
