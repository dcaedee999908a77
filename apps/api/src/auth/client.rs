use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthError, AuthGrant, AuthProvider, AuthUser, SignUpGrant, UserMetadata};

const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a UserMetadata,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// The service reports errors under several keys depending on the endpoint.
#[derive(Debug, Default, Deserialize)]
struct ServiceErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ServiceErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// REST client for the hosted auth service (GoTrue-compatible endpoints).
#[derive(Clone)]
pub struct HostedAuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl HostedAuthClient {
    pub fn new(base_url: String, anon_key: String) -> Result<Self, AuthError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url,
            anon_key,
        })
    }

    fn post(&self, path: &str, bearer: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Turns a non-2xx response into `AuthError::Service`, keeping the service's message.
    async fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!("Auth service returned {}: {}", status, body);
        let message = serde_json::from_str::<ServiceErrorBody>(&body)
            .ok()
            .and_then(ServiceErrorBody::into_message)
            .unwrap_or(body);
        Err(AuthError::Service {
            status: status.as_u16(),
            message,
        })
    }

    async fn token(&self, grant_type: &str, body: &(impl Serialize + Sync)) -> Result<AuthGrant, AuthError> {
        let response = self
            .post(&format!("/token?grant_type={grant_type}"), &self.anon_key)
            .json(body)
            .send()
            .await?;
        let grant: AuthGrant = Self::check(response).await?.json().await?;
        debug!(user_id = %grant.user.id, grant_type, "Auth token issued");
        Ok(grant)
    }
}

/// Sign-up answers with a session when confirmation is off and a bare user otherwise.
pub(crate) fn parse_sign_up(body: Value) -> Result<SignUpGrant, AuthError> {
    if body.get("access_token").is_some() {
        let grant: AuthGrant = serde_json::from_value(body)?;
        return Ok(SignUpGrant {
            user: grant.user.clone(),
            grant: Some(grant),
        });
    }
    let user: AuthUser = serde_json::from_value(body)?;
    Ok(SignUpGrant { user, grant: None })
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<SignUpGrant, AuthError> {
        let response = self
            .post("/signup", &self.anon_key)
            .json(&SignUpRequest {
                email,
                password,
                data: metadata,
            })
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;
        parse_sign_up(body)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        self.token("password", &PasswordCredentials { email, password })
            .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthGrant, AuthError> {
        self.token("refresh_token", &RefreshRequest { refresh_token })
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self.post("/logout", access_token).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
