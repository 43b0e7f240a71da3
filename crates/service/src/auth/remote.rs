use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::domain::{AuthSession, AuthUser};
use super::errors::AuthError;
use super::provider::IdentityProvider;
use crate::backend::{error_message, BackendClient};

/// [`IdentityProvider`] over the hosted identity API (`/auth/v1`).
pub struct RemoteIdentityProvider {
    client: BackendClient,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserResponse> for AuthUser {
    fn from(u: UserResponse) -> Self {
        AuthUser { id: u.id, email: u.email.unwrap_or_default() }
    }
}

fn expiry(expires_at: Option<i64>, expires_in: Option<i64>) -> DateTime<Utc> {
    expires_at
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(|| Utc::now() + Duration::seconds(expires_in.unwrap_or(3600)))
}

/// Credential and token problems are `Unauthorized`; anything else is a provider failure.
async fn auth_error(resp: Response) -> AuthError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::UNPROCESSABLE_ENTITY => AuthError::Unauthorized(message),
        _ => AuthError::Provider(format!("{status}: {message}")),
    }
}

fn transport(e: reqwest::Error) -> AuthError {
    AuthError::Provider(e.to_string())
}

impl RemoteIdentityProvider {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let resp = self
            .client
            .request(Method::POST, "auth/v1/token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(auth_error(resp).await);
        }
        let token: TokenResponse = resp.json().await.map_err(transport)?;
        debug!(user_id = %token.user.id, "password grant accepted");
        Ok(AuthSession {
            expires_at: expiry(token.expires_at, token.expires_in),
            user: token.user.into(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let resp = self
            .client
            .user_request(Method::GET, "auth/v1/user", access_token)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(auth_error(resp).await);
        }
        let user: UserResponse = resp.json().await.map_err(transport)?;
        Ok(user.into())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let resp = self
            .client
            .user_request(Method::POST, "auth/v1/logout", access_token)
            .send()
            .await
            .map_err(transport)?;
        // an already revoked token is as good as signed out
        if resp.status().is_success() || resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(auth_error(resp).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_prefers_absolute_timestamp() {
        let at = expiry(Some(1_700_000_000), Some(60));
        assert_eq!(at.timestamp(), 1_700_000_000);
        let rel = expiry(None, Some(60));
        assert!(rel > Utc::now() && rel <= Utc::now() + Duration::seconds(61));
    }
}
