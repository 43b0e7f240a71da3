use async_trait::async_trait;

use super::domain::{AuthSession, AuthUser};
use super::errors::AuthError;

/// Source of truth for admin identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// User behind an access token; `Unauthorized` when the token is not valid.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// Fixed-credential provider for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    pub struct StaticIdentityProvider {
        email: String,
        password: String,
        user_id: String,
        live: Mutex<HashSet<String>>, // issued, not signed out
    }

    impl StaticIdentityProvider {
        pub fn new(email: &str, password: &str) -> Self {
            Self {
                email: email.to_string(),
                password: password.to_string(),
                user_id: Uuid::new_v4().to_string(),
                live: Mutex::new(HashSet::new()),
            }
        }

        fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashSet<String>>, AuthError> {
            self.live.lock().map_err(|_| AuthError::Provider("token set lock poisoned".into()))
        }
    }

    #[async_trait]
    impl IdentityProvider for StaticIdentityProvider {
        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
            if email != self.email || password != self.password {
                return Err(AuthError::Unauthorized("Invalid login credentials".into()));
            }
            let token = Uuid::new_v4().simple().to_string();
            self.lock()?.insert(token.clone());
            Ok(AuthSession {
                user: AuthUser { id: self.user_id.clone(), email: self.email.clone() },
                access_token: token,
                refresh_token: None,
                expires_at: Utc::now() + Duration::hours(1),
            })
        }

        async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
            if self.lock()?.contains(access_token) {
                Ok(AuthUser { id: self.user_id.clone(), email: self.email.clone() })
            } else {
                Err(AuthError::Unauthorized("invalid or expired session".into()))
            }
        }

        async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
            self.lock()?.remove(access_token);
            Ok(())
        }
    }
}
