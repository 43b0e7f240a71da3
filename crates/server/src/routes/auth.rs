use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use service::auth::{AuthUser, LoginInput};
use tracing::warn;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, Serialize)]
pub struct LoginOutput {
    pub user: AuthUser,
    pub access_token: String,
    pub expires_at: String,
}

/// Bearer token from `Authorization`, else the `auth_token` cookie.
pub fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(t) = bearer {
        return Some(t.to_string());
    }
    jar.get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let Json(input) = payload.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let session = state.auth.authenticate(input).await?;
    let jar = jar.add(session_cookie(session.access_token.clone()));
    let out = LoginOutput {
        user: session.user,
        access_token: session.access_token,
        expires_at: session.expires_at.to_rfc3339(),
    };
    Ok((jar, Json(out)))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(token) = session_token(&headers, &jar) {
        if let Err(e) = state.auth.logout(&token).await {
            warn!(error = %e, "provider sign-out failed; clearing cookie anyway");
        }
    }
    let mut gone = Cookie::from(AUTH_COOKIE);
    gone.set_path("/");
    (jar.remove(gone), StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<AuthUser>, JsonApiError> {
    let token = session_token(&headers, &jar).ok_or_else(|| JsonApiError::unauthorized("not signed in"))?;
    Ok(Json(state.auth.verify(&token).await?))
}
