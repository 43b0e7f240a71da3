//! Admin sign-in: domain types, the identity provider seam and the service on top.
//!
//! `remote` talks to the hosted identity API; `local` checks one configured
//! admin against an argon2 hash and issues its own tokens.

pub mod domain;
pub mod errors;
pub mod provider;
pub mod remote;
pub mod local;
pub mod service;

pub use domain::{AuthSession, AuthUser, LoginInput};
pub use errors::AuthError;
pub use provider::IdentityProvider;
pub use service::AuthService;
