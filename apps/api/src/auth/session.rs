use std::fmt;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::auth::{AuthGrant, AuthUser};

/// Refresh this long before the access token actually expires.
const REFRESH_MARGIN_SECS: i64 = 60;

/// An authenticated session, passed explicitly to every service that acts on
/// behalf of a user.
///
/// Lifecycle: created from the grant returned at sign-in, replaced in place by
/// `apply_refresh` when the auth service rotates the tokens, and dropped at
/// sign-out.
#[derive(Clone)]
pub struct Session {
    user: AuthUser,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn from_grant(grant: AuthGrant, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: now + Duration::seconds(grant.expires_in),
            user: grant.user,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }

    /// Swaps in rotated tokens. The user must not change across a refresh.
    pub fn apply_refresh(&mut self, grant: AuthGrant, now: DateTime<Utc>) {
        debug_assert_eq!(grant.user.id, self.user.id);
        self.access_token = grant.access_token;
        self.refresh_token = grant.refresh_token;
        self.expires_at = now + Duration::seconds(grant.expires_in);
        self.user = grant.user;
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user.id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
