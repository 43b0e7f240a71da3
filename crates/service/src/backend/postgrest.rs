use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use super::{error_for_status, BackendClient, Caller, ContentStore, Row, StoreError};

/// [`ContentStore`] over the backend's REST interface (`/rest/v1/<table>`).
pub struct PostgrestStore {
    client: BackendClient,
}

impl PostgrestStore {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn table(collection: &str) -> String {
        format!("rest/v1/{collection}")
    }

    async fn rows(resp: reqwest::Response) -> Result<Vec<Row>, StoreError> {
        let resp = error_for_status(resp).await?;
        let rows = resp.json::<Vec<Row>>().await?;
        Ok(rows)
    }
}

#[async_trait]
impl ContentStore for PostgrestStore {
    async fn list(&self, collection: &str) -> Result<Vec<Row>, StoreError> {
        let resp = self
            .client
            .request(Method::GET, &Self::table(collection))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let rows = Self::rows(resp).await?;
        debug!(collection, count = rows.len(), "rows_listed");
        Ok(rows)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Row>, StoreError> {
        let filter = format!("eq.{id}");
        let resp = self
            .client
            .request(Method::GET, &Self::table(collection))
            .query(&[("select", "*"), ("id", filter.as_str())])
            .send()
            .await?;
        Ok(Self::rows(resp).await?.into_iter().next())
    }

    async fn insert(&self, collection: &str, row: Row, caller: Caller<'_>) -> Result<Row, StoreError> {
        let resp = self
            .client
            .request_as(Method::POST, &Self::table(collection), caller)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".into()))
    }

    async fn update(&self, collection: &str, id: &str, row: Row, caller: Caller<'_>) -> Result<Option<Row>, StoreError> {
        let filter = format!("eq.{id}");
        let resp = self
            .client
            .request_as(Method::PATCH, &Self::table(collection), caller)
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Ok(Self::rows(resp).await?.into_iter().next())
    }

    async fn delete(&self, collection: &str, id: &str, caller: Caller<'_>) -> Result<bool, StoreError> {
        let filter = format!("eq.{id}");
        let resp = self
            .client
            .request_as(Method::DELETE, &Self::table(collection), caller)
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Ok(!Self::rows(resp).await?.is_empty())
    }
}
