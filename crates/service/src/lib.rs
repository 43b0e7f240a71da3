//! Service layer between the HTTP routes and the hosted backend.
//! - `backend`: store, object storage and HTTP clients for the hosted backend.
//! - `content`: the content repository and its read fallback policy.
//! - `media` and `auth`: image uploads and admin sessions.

pub mod errors;
pub mod backend;
pub mod storage;
pub mod content;
pub mod media;
pub mod auth;
pub mod metrics;
pub mod runtime;
