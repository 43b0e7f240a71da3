use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::backend::StoreError;

fn io_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Io(e.to_string())
}

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file and provides simple CRUD helpers.
/// Every mutation rewrites the whole file.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Decode(format!("{}: {e}", file_path.display())))?,
            Err(_) => {
                let empty: HashMap<K, V> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(io_err)?)
                    .await
                    .map_err(io_err)?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save(&self, map: &HashMap<K, V>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(map).map_err(io_err)?;
        fs::write(&self.file_path, data).await.map_err(io_err)?;
        Ok(())
    }

    /// All values, in no particular order.
    pub async fn values(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        self.save(&map).await
    }

    /// Rewrite an existing value and persist; `None` if the key is absent.
    pub async fn update<F>(&self, key: &K, f: F) -> Result<Option<V>, StoreError>
    where
        F: FnOnce(&V) -> Result<V, StoreError>,
    {
        let mut map = self.inner.write().await;
        let Some(current) = map.get(key) else {
            return Ok(None);
        };
        let next = f(current)?;
        map.insert(key.clone(), next.clone());
        self.save(&map).await?;
        Ok(Some(next))
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, StoreError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        if existed {
            self.save(&map).await?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.values().await.len(), 0);

        store.insert("a".into(), "1".into()).await?;
        store.insert("b".into(), "2".into()).await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));

        let updated = store.update(&"a".into(), |v| Ok(format!("{v}0"))).await?;
        assert_eq!(updated.as_deref(), Some("10"));
        assert!(store.update(&"zz".into(), |v| Ok(v.clone())).await?.is_none());

        // remove and reload persistence
        assert!(store.remove(&"b".into()).await?);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.values().await, vec!["10".to_string()]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, b"{not json").await.unwrap();
        let res = JsonMapStore::<String, String>::new(&tmp).await;
        assert!(matches!(res, Err(StoreError::Decode(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
    }
}
