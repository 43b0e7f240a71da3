use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::backend::object_storage::ObjectStorage;
use crate::backend::{Caller, StoreError};

/// [`ObjectStorage`] writing objects to `<root>/<bucket>/<name>`.
///
/// `public_base` is the URL under which `root` is served, e.g.
/// `http://127.0.0.1:8080/uploads`.
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStorage {
    pub fn new<P: Into<PathBuf>>(root: P, public_base: &str) -> Self {
        Self { root: root.into(), public_base: public_base.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        _caller: Caller<'_>,
    ) -> Result<(), StoreError> {
        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir).await.map_err(|e| StoreError::Io(e.to_string()))?;
        fs::write(dir.join(name), bytes).await.map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/{bucket}/{name}", self.public_base)
    }
}
