//! Access to the hosted backend (tables, object storage, identity).
//!
//! The traits here are the seams the rest of the crate depends on; the
//! HTTP clients, the JSON file store and the mocks implement them.

pub mod postgrest;
pub mod object_storage;
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use thiserror::Error;

/// One table row as returned by the store.
pub type Row = Value;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Transport(e.to_string())
        }
    }
}

/// Identity a write is sent with.
///
/// The hosted backend enforces row-level security against the bearer token,
/// so admin writes carry the signed-in user's access token. Local stores
/// ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Caller<'a> {
    #[default]
    Anonymous,
    User(&'a str),
}

impl<'a> Caller<'a> {
    pub fn access_token(&self) -> Option<&'a str> {
        match self {
            Caller::Anonymous => None,
            Caller::User(token) => Some(token),
        }
    }
}

/// Row-level CRUD on named collections.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All rows of a collection, newest `created_at` first.
    async fn list(&self, collection: &str) -> Result<Vec<Row>, StoreError>;
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Row>, StoreError>;
    /// Insert a row. The store assigns `id` and `created_at` and returns the stored row.
    async fn insert(&self, collection: &str, row: Row, caller: Caller<'_>) -> Result<Row, StoreError>;
    /// Overwrite the given fields of one row; `None` when no row has that id.
    async fn update(&self, collection: &str, id: &str, row: Row, caller: Caller<'_>) -> Result<Option<Row>, StoreError>;
    /// Returns whether a row was deleted.
    async fn delete(&self, collection: &str, id: &str, caller: Caller<'_>) -> Result<bool, StoreError>;
}

/// Shared HTTP client for one backend project. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BackendClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request authorised with the project's anon key.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Request on behalf of a signed-in user.
    pub fn user_request(&self, method: Method, path: &str, access_token: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
    }

    /// Request as `caller`: the user's token when there is one, else the anon key.
    pub fn request_as(&self, method: Method, path: &str, caller: Caller<'_>) -> RequestBuilder {
        match caller.access_token() {
            Some(token) => self.user_request(method, path, token),
            None => self.request(method, path),
        }
    }
}

/// Pass 2xx responses through, turn everything else into [`StoreError::Status`].
pub async fn error_for_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(body);
    Err(StoreError::Status { status: status.as_u16(), message })
}

/// Human readable message from a backend error body.
pub fn error_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Set server-owned columns on a row about to be inserted.
pub(crate) fn stamp_row(row: Row, id: &str, created_at: &str) -> Result<Row, StoreError> {
    match row {
        Value::Object(mut fields) => {
            fields.insert("id".into(), Value::String(id.to_string()));
            fields.insert("created_at".into(), Value::String(created_at.to_string()));
            Ok(Value::Object(fields))
        }
        _ => Err(StoreError::Decode("row must be a JSON object".into())),
    }
}

/// Copy the fields of `patch` onto `existing`; `id` and `created_at` are never overwritten.
pub(crate) fn merge_row(existing: &Row, patch: Row) -> Result<Row, StoreError> {
    let (Value::Object(mut base), Value::Object(fields)) = (existing.clone(), patch) else {
        return Err(StoreError::Decode("row must be a JSON object".into()));
    };
    for (k, v) in fields {
        if k == "id" || k == "created_at" {
            continue;
        }
        base.insert(k, v);
    }
    Ok(Value::Object(base))
}

/// Newest first; rows without `created_at` go last. Stable for equal stamps.
pub(crate) fn sort_newest_first(rows: &mut [Row]) {
    rows.sort_by(|a, b| {
        let ka = a.get("created_at").and_then(Value::as_str);
        let kb = b.get("created_at").and_then(Value::as_str);
        kb.cmp(&ka)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid login credentials"));
        assert_eq!(error_message(r#"{"msg":"bad"}"#).as_deref(), Some("bad"));
        assert_eq!(error_message("<html>"), None);
    }

    #[test]
    fn merge_keeps_server_columns() {
        let existing = json!({"id": "a", "created_at": "t0", "title": "old"});
        let merged = merge_row(&existing, json!({"id": "b", "title": "new"})).unwrap();
        assert_eq!(merged, json!({"id": "a", "created_at": "t0", "title": "new"}));
    }

    #[test]
    fn sort_puts_unstamped_rows_last() {
        let mut rows = vec![
            json!({"id": "none"}),
            json!({"id": "old", "created_at": "2024-01-01T00:00:00.000000Z"}),
            json!({"id": "new", "created_at": "2025-01-01T00:00:00.000000Z"}),
        ];
        sort_newest_first(&mut rows);
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["new", "old", "none"]);
    }

    #[test]
    fn caller_exposes_only_user_tokens() {
        assert_eq!(Caller::default().access_token(), None);
        assert_eq!(Caller::User("jwt").access_token(), Some("jwt"));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let c = BackendClient::new("https://x.supabase.co/", "k", Duration::from_secs(1)).unwrap();
        assert_eq!(c.url("/rest/v1/services"), "https://x.supabase.co/rest/v1/services");
    }
}
