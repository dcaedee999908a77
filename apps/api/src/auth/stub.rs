//! Scripted `AuthProvider` for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::auth::{AuthError, AuthGrant, AuthProvider, AuthUser, SignUpGrant, UserMetadata};

struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
pub struct StubAuth {
    accounts: Mutex<HashMap<String, Account>>,
    issued: Mutex<HashMap<String, AuthUser>>,
    signed_out: Mutex<Vec<String>>,
    expires_in: i64,
}

impl StubAuth {
    pub fn new() -> Self {
        Self {
            expires_in: 3600,
            ..Default::default()
        }
    }

    pub fn with_expiry(expires_in: i64) -> Self {
        Self {
            expires_in,
            ..Default::default()
        }
    }

    /// Registers a confirmed account and returns its user id.
    pub fn register(&self, email: &str, password: &str, username: Option<&str>) -> Uuid {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: UserMetadata {
                username: username.map(str::to_string),
                full_name: None,
            },
        };
        let id = user.id;
        self.accounts.lock().insert(
            email.to_string(),
            Account {
                user,
                password: password.to_string(),
            },
        );
        id
    }

    pub fn signed_out_tokens(&self) -> Vec<String> {
        self.signed_out.lock().clone()
    }

    fn grant(&self, user: AuthUser) -> AuthGrant {
        let token = Uuid::new_v4().to_string();
        let refresh_token = format!("refresh-{token}");
        self.issued.lock().insert(refresh_token.clone(), user.clone());
        AuthGrant {
            access_token: format!("access-{token}"),
            refresh_token,
            expires_in: self.expires_in,
            user,
        }
    }
}

fn rejected(message: &str) -> AuthError {
    AuthError::Service {
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait]
impl AuthProvider for StubAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<SignUpGrant, AuthError> {
        let mut accounts = self.accounts.lock();
        if accounts.contains_key(email) {
            return Err(rejected("User already registered"));
        }
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: metadata.clone(),
        };
        accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        Ok(SignUpGrant { user, grant: None })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        let user = {
            let accounts = self.accounts.lock();
            match accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(rejected("Invalid login credentials")),
            }
        };
        Ok(self.grant(user))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthGrant, AuthError> {
        let user = self
            .issued
            .lock()
            .remove(refresh_token)
            .ok_or_else(|| rejected("Invalid Refresh Token"))?;
        Ok(self.grant(user))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.signed_out.lock().push(access_token.to_string());
        Ok(())
    }
}
