use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Method};

use super::{error_for_status, BackendClient, Caller, StoreError};

/// Binary objects in named buckets.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
        caller: Caller<'_>,
    ) -> Result<(), StoreError>;

    /// Publicly resolvable URL of an uploaded object.
    fn public_url(&self, bucket: &str, name: &str) -> String;
}

/// [`ObjectStorage`] over the backend's storage API (`/storage/v1/object`).
pub struct StorageClient {
    client: BackendClient,
}

impl StorageClient {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
        caller: Caller<'_>,
    ) -> Result<(), StoreError> {
        let resp = self
            .client
            .request_as(Method::POST, &format!("storage/v1/object/{bucket}/{name}"), caller)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        error_for_status(resp).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        self.client.url(&format!("storage/v1/object/public/{bucket}/{name}"))
    }
}
