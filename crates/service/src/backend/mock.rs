//! In-memory stand-ins for the hosted backend, for tests and doc examples.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::object_storage::ObjectStorage;
use super::{merge_row, now_timestamp, sort_newest_first, stamp_row, Caller, ContentStore, Row, StoreError};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Io("memory store lock poisoned".into())
}

/// Collections held in a map; behaves like the hosted tables.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, Vec<Row>>>, // key: collection
    last_token: Mutex<Option<String>>,
}

/// Remember the access token of the latest write.
fn note_caller(slot: &Mutex<Option<String>>, caller: Caller<'_>) {
    if let Ok(mut last) = slot.lock() {
        *last = caller.access_token().map(str::to_string);
    }
}

impl MemoryStore {
    /// Store pre-populated with rows for one collection, kept as given.
    pub fn with_rows(collection: &str, rows: Vec<Row>) -> Self {
        let store = Self::default();
        if let Ok(mut map) = store.rows.lock() {
            map.insert(collection.to_string(), rows);
        }
        store
    }

    /// Access token the latest insert, update or delete was sent with.
    pub fn last_access_token(&self) -> Option<String> {
        self.last_token.lock().ok()?.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<Row>, StoreError> {
        let map = self.rows.lock().map_err(poisoned)?;
        let mut rows = map.get(collection).cloned().unwrap_or_default();
        sort_newest_first(&mut rows);
        Ok(rows)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Row>, StoreError> {
        let map = self.rows.lock().map_err(poisoned)?;
        Ok(map
            .get(collection)
            .and_then(|rows| rows.iter().find(|r| r["id"] == id))
            .cloned())
    }

    async fn insert(&self, collection: &str, row: Row, caller: Caller<'_>) -> Result<Row, StoreError> {
        note_caller(&self.last_token, caller);
        let row = stamp_row(row, &Uuid::new_v4().to_string(), &now_timestamp())?;
        let mut map = self.rows.lock().map_err(poisoned)?;
        // newest first so equal timestamps still list in insertion order
        map.entry(collection.to_string()).or_default().insert(0, row.clone());
        Ok(row)
    }

    async fn update(&self, collection: &str, id: &str, row: Row, caller: Caller<'_>) -> Result<Option<Row>, StoreError> {
        note_caller(&self.last_token, caller);
        let mut map = self.rows.lock().map_err(poisoned)?;
        let Some(slot) = map
            .get_mut(collection)
            .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id))
        else {
            return Ok(None);
        };
        *slot = merge_row(slot, row)?;
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, collection: &str, id: &str, caller: Caller<'_>) -> Result<bool, StoreError> {
        note_caller(&self.last_token, caller);
        let mut map = self.rows.lock().map_err(poisoned)?;
        let Some(rows) = map.get_mut(collection) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| r["id"] != id);
        Ok(rows.len() != before)
    }
}

/// Every call fails as if the backend could not be reached.
#[derive(Default)]
pub struct UnreachableStore;

impl UnreachableStore {
    fn refused() -> StoreError {
        StoreError::Transport("connection refused".into())
    }
}

#[async_trait]
impl ContentStore for UnreachableStore {
    async fn list(&self, _collection: &str) -> Result<Vec<Row>, StoreError> {
        Err(Self::refused())
    }

    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Row>, StoreError> {
        Err(Self::refused())
    }

    async fn insert(&self, _collection: &str, _row: Row, _caller: Caller<'_>) -> Result<Row, StoreError> {
        Err(Self::refused())
    }

    async fn update(&self, _collection: &str, _id: &str, _row: Row, _caller: Caller<'_>) -> Result<Option<Row>, StoreError> {
        Err(Self::refused())
    }

    async fn delete(&self, _collection: &str, _id: &str, _caller: Caller<'_>) -> Result<bool, StoreError> {
        Err(Self::refused())
    }
}

/// Object storage that keeps uploads in memory and counts calls.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>, // key: bucket/name
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
}

impl MemoryObjectStorage {
    pub fn upload_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn object(&self, bucket: &str, name: &str) -> Option<Vec<u8>> {
        let map = self.objects.lock().ok()?;
        map.get(&format!("{bucket}/{name}")).cloned()
    }

    pub fn last_access_token(&self) -> Option<String> {
        self.last_token.lock().ok()?.clone()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        caller: Caller<'_>,
    ) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        note_caller(&self.last_token, caller);
        let mut map = self.objects.lock().map_err(poisoned)?;
        map.insert(format!("{bucket}/{name}"), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("https://storage.test/{bucket}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_crud() -> Result<(), StoreError> {
        let store = MemoryStore::default();
        let a = store.insert("services", json!({"title": "a"}), Caller::User("jwt")).await?;
        assert_eq!(store.last_access_token().as_deref(), Some("jwt"));
        let b = store.insert("services", json!({"title": "b"}), Caller::Anonymous).await?;
        assert_eq!(store.last_access_token(), None);
        let id_a = a["id"].as_str().unwrap().to_string();

        let listed = store.list("services").await?;
        assert_eq!(listed[0]["id"], b["id"]);
        assert_eq!(listed.len(), 2);

        let updated = store.update("services", &id_a, json!({"title": "a2"}), Caller::Anonymous).await?.unwrap();
        assert_eq!(updated["title"], "a2");
        assert_eq!(updated["created_at"], a["created_at"]);
        assert!(store.update("services", "missing", json!({}), Caller::Anonymous).await?.is_none());

        assert!(store.delete("services", &id_a, Caller::Anonymous).await?);
        assert!(!store.delete("services", &id_a, Caller::Anonymous).await?);
        assert!(store.get("services", &id_a).await?.is_none());
        Ok(())
    }
}
