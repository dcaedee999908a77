//! Auth gate. All calls to the hosted auth service go through `AuthProvider`;
//! the rest of the app only ever sees an explicit `Session`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod client;
pub mod errors;
pub mod flow;
pub mod guard;
pub mod handlers;
pub mod service;
pub mod session;
#[cfg(test)]
pub mod stub;

pub use client::HostedAuthClient;
pub use session::Session;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Unexpected auth response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AuthError {
    /// Text fed to the user-facing message mapping.
    pub fn message(&self) -> String {
        match self {
            AuthError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Profile hints stored with the auth user at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Tokens issued by the auth service on sign-in or refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: AuthUser,
}

/// Sign-up yields tokens only when the project does not require email confirmation.
#[derive(Debug, Clone)]
pub struct SignUpGrant {
    pub user: AuthUser,
    pub grant: Option<AuthGrant>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<SignUpGrant, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<AuthGrant, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}
