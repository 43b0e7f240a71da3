use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::domain::{AuthSession, AuthUser, LoginInput};
use super::errors::AuthError;
use super::provider::IdentityProvider;
use crate::metrics;

/// Admin session workflows, independent of web framework
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Sign in with email and password.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{AuthService, LoginInput};
    /// use service::auth::provider::mock::StaticIdentityProvider;
    ///
    /// let svc = AuthService::new(Arc::new(StaticIdentityProvider::new("admin@hls.de", "geheim")));
    /// let input = LoginInput { email: " admin@hls.de ".into(), password: "geheim".into() };
    /// let session = tokio_test::block_on(svc.authenticate(input)).unwrap();
    /// assert_eq!(session.user.email, "admin@hls.de");
    /// assert!(!session.access_token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email.trim()))]
    pub async fn authenticate(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = input.email.trim();
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("email and password are required".into()));
        }
        let res = self.provider.sign_in_with_password(email, &input.password).await;
        metrics::LOGINS_TOTAL.with_label_values(&[metrics::outcome(&res)]).inc();
        match &res {
            Ok(session) => info!(user_id = %session.user.id, "admin_signed_in"),
            Err(e) => warn!(code = e.code(), error = %e, "sign-in rejected"),
        }
        res
    }

    /// User behind a session token.
    pub async fn verify(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        if access_token.trim().is_empty() {
            return Err(AuthError::Unauthorized("missing session token".into()));
        }
        self.provider.get_user(access_token).await
    }

    #[instrument(skip_all)]
    pub async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        self.provider.sign_out(access_token).await?;
        info!("admin_signed_out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::mock::StaticIdentityProvider;

    fn svc() -> AuthService {
        AuthService::new(Arc::new(StaticIdentityProvider::new("admin@hls.de", "geheim")))
    }

    fn login(email: &str, password: &str) -> LoginInput {
        LoginInput { email: email.into(), password: password.into() }
    }

    #[tokio::test]
    async fn blank_fields_are_a_validation_error() {
        assert!(matches!(svc().authenticate(login("  ", "x")).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc().authenticate(login("admin@hls.de", "")).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn bad_credentials_carry_provider_message() {
        let err = svc().authenticate(login("admin@hls.de", "falsch")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn session_round_trip() -> Result<(), AuthError> {
        let svc = svc();
        let session = svc.authenticate(login("admin@hls.de", "geheim")).await?;
        assert_eq!(svc.verify(&session.access_token).await?, session.user);
        svc.logout(&session.access_token).await?;
        assert!(matches!(svc.verify(&session.access_token).await, Err(AuthError::Unauthorized(_))));
        assert!(matches!(svc.verify("").await, Err(AuthError::Unauthorized(_))));
        Ok(())
    }
}
