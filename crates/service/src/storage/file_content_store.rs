use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use models::ContentKind;
use tracing::info;
use uuid::Uuid;

use crate::backend::{merge_row, now_timestamp, sort_newest_first, stamp_row, Caller, ContentStore, Row, StoreError};
use crate::storage::json_map_store::JsonMapStore;

/// [`ContentStore`] keeping each collection in `<dir>/<collection>.json`.
pub struct FileContentStore {
    collections: HashMap<&'static str, Arc<JsonMapStore<String, Row>>>,
}

impl FileContentStore {
    /// Open (or create) one file per content collection under `dir`.
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let mut collections = HashMap::new();
        for kind in ContentKind::ALL {
            let path = dir.join(format!("{}.json", kind.collection()));
            collections.insert(kind.collection(), JsonMapStore::new(path).await?);
        }
        info!(dir = %dir.display(), "file content store opened");
        Ok(Self { collections })
    }

    fn collection(&self, name: &str) -> Result<&Arc<JsonMapStore<String, Row>>, StoreError> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }
}

#[async_trait]
impl ContentStore for FileContentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Row>, StoreError> {
        let mut rows = self.collection(collection)?.values().await;
        sort_newest_first(&mut rows);
        Ok(rows)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Row>, StoreError> {
        Ok(self.collection(collection)?.get(&id.to_string()).await)
    }

    async fn insert(&self, collection: &str, row: Row, _caller: Caller<'_>) -> Result<Row, StoreError> {
        let store = self.collection(collection)?;
        let id = Uuid::new_v4().to_string();
        let row = stamp_row(row, &id, &now_timestamp())?;
        store.insert(id, row.clone()).await?;
        Ok(row)
    }

    async fn update(&self, collection: &str, id: &str, row: Row, _caller: Caller<'_>) -> Result<Option<Row>, StoreError> {
        self.collection(collection)?
            .update(&id.to_string(), |existing| merge_row(existing, row))
            .await
    }

    async fn delete(&self, collection: &str, id: &str, _caller: Caller<'_>) -> Result<bool, StoreError> {
        self.collection(collection)?.remove(&id.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn rows_survive_reopen() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("file_content_store_{}", Uuid::new_v4()));
        let store = FileContentStore::open(&dir).await?;
        let row = store.insert("job_positions", json!({"title": "Bauleiter"}), Caller::Anonymous).await?;
        let id = row["id"].as_str().unwrap().to_string();

        let reopened = FileContentStore::open(&dir).await?;
        let got = reopened.get("job_positions", &id).await?.unwrap();
        assert_eq!(got["title"], "Bauleiter");
        assert!(got["created_at"].is_string());
        assert!(reopened.list("team_members").await?.is_empty());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn unknown_collection_is_rejected() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("file_content_store_{}", Uuid::new_v4()));
        let store = FileContentStore::open(&dir).await?;
        let err = store.list("users").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownCollection(_)));
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
