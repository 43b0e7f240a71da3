use std::collections::HashMap;
use std::sync::Mutex;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{AuthSession, AuthUser};
use super::errors::AuthError;
use super::provider::IdentityProvider;

const LOCAL_ADMIN_ID: &str = "local-admin";
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    uid: String,
    iat: i64,
    exp: i64,
}

/// Hash a password into the PHC string expected in `auth.admin_password_hash`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

/// One configured admin, checked against an argon2 hash; sessions are HS256 JWTs.
pub struct LocalIdentityProvider {
    email: String,
    password_hash: String,
    secret: String,
    ttl: Duration,
    revoked: Mutex<HashMap<String, i64>>, // token -> exp
}

impl LocalIdentityProvider {
    pub fn new(email: &str, password_hash: &str, jwt_secret: &str, ttl_hours: i64) -> Result<Self, AuthError> {
        PasswordHash::new(password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Self {
            email: email.trim().to_string(),
            password_hash: password_hash.to_string(),
            secret: jwt_secret.to_string(),
            ttl: Duration::hours(ttl_hours),
            revoked: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Result<Self, AuthError> {
        Self::new(&cfg.admin_email, &cfg.admin_password_hash, &cfg.jwt_secret, cfg.token_ttl_hours)
    }

    fn user(&self) -> AuthUser {
        AuthUser { id: LOCAL_ADMIN_ID.to_string(), email: self.email.clone() }
    }

    fn password_matches(&self, password: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(&self.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }

    fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let revoked = self.revoked.lock().map_err(|_| AuthError::Provider("revocation list poisoned".into()))?;
        Ok(revoked.contains_key(token))
    }

    fn claims(&self, token: &str) -> Result<Claims, AuthError> {
        // no leeway: a revoked entry may be dropped as soon as `exp` passes
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map_err(|e| {
                debug!(error = %e, "rejected access token");
                AuthError::Unauthorized("invalid or expired session".into())
            })?;
        if data.claims.sub != self.email {
            return Err(AuthError::Unauthorized("invalid or expired session".into()));
        }
        Ok(data.claims)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if !email.trim().eq_ignore_ascii_case(&self.email) || !self.password_matches(password)? {
            return Err(AuthError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: self.email.clone(),
            uid: LOCAL_ADMIN_ID.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(AuthSession { user: self.user(), access_token: token, refresh_token: None, expires_at })
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        if self.is_revoked(access_token)? {
            return Err(AuthError::Unauthorized("session has been signed out".into()));
        }
        self.claims(access_token)?;
        Ok(self.user())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.lock().map_err(|_| AuthError::Provider("revocation list poisoned".into()))?;
        revoked.retain(|_, exp| *exp > now);
        // a token that no longer verifies is already unusable
        if let Ok(claims) = self.claims(access_token) {
            revoked.insert(access_token.to_string(), claims.exp);
        }
        Ok(())
    }
}
