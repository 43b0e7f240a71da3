//! Runtime environment helpers
//!
//! Directory checks and the wiring of stores, uploads and identity for the
//! configured backend mode, so binaries only deal with `AppConfig`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use configs::{AppConfig, AuthProvider, BackendMode};
use tracing::info;

use crate::auth::local::LocalIdentityProvider;
use crate::auth::remote::RemoteIdentityProvider;
use crate::auth::{AuthService, IdentityProvider};
use crate::backend::object_storage::{ObjectStorage, StorageClient};
use crate::backend::postgrest::PostgrestStore;
use crate::backend::{BackendClient, ContentStore};
use crate::content::ContentRepository;
use crate::media::ImageUploader;
use crate::storage::file_content_store::FileContentStore;
use crate::storage::local_objects::LocalObjectStorage;

/// Path prefix under which file-mode uploads are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Ensure data directories exist; warn when the static frontend is missing.
pub async fn ensure_env(cfg: &AppConfig) -> anyhow::Result<()> {
    let mut dirs = Vec::new();
    if cfg.backend.mode == BackendMode::File {
        dirs.push(cfg.backend.data_dir.as_str());
        dirs.push(cfg.storage.upload_dir.as_str());
    }
    common::env::ensure_env(&cfg.server.static_dir, dirs.as_slice()).await
}

/// Everything the HTTP layer needs, built for one configuration.
#[derive(Clone)]
pub struct Backends {
    pub content: ContentRepository,
    pub uploader: ImageUploader,
    pub auth: AuthService,
}

pub async fn build_backends(cfg: &AppConfig) -> anyhow::Result<Backends> {
    let (store, objects): (Arc<dyn ContentStore>, Arc<dyn ObjectStorage>) = match cfg.backend.mode {
        BackendMode::Remote => {
            let client = remote_client(cfg)?;
            info!(url = %client.base_url(), "using hosted backend");
            let store: Arc<dyn ContentStore> = Arc::new(PostgrestStore::new(client.clone()));
            let objects: Arc<dyn ObjectStorage> = Arc::new(StorageClient::new(client));
            (store, objects)
        }
        BackendMode::File => {
            let store = FileContentStore::open(&cfg.backend.data_dir)
                .await
                .with_context(|| format!("opening content store in {}", cfg.backend.data_dir))?;
            let public_base = format!("http://{}:{}{}", cfg.server.host, cfg.server.port, UPLOADS_ROUTE);
            info!(data_dir = %cfg.backend.data_dir, upload_dir = %cfg.storage.upload_dir, "using local file backend");
            let objects: Arc<dyn ObjectStorage> =
                Arc::new(LocalObjectStorage::new(&cfg.storage.upload_dir, &public_base));
            (Arc::new(store) as Arc<dyn ContentStore>, objects)
        }
    };

    let identity: Arc<dyn IdentityProvider> = match cfg.auth.provider {
        AuthProvider::Remote => Arc::new(RemoteIdentityProvider::new(remote_client(cfg)?)),
        AuthProvider::Local => Arc::new(
            LocalIdentityProvider::from_config(&cfg.auth).context("local admin credentials")?,
        ),
    };

    Ok(Backends {
        content: ContentRepository::new(store),
        uploader: ImageUploader::new(objects, cfg.storage.bucket.clone(), cfg.storage.max_upload_bytes),
        auth: AuthService::new(identity),
    })
}

fn remote_client(cfg: &AppConfig) -> anyhow::Result<BackendClient> {
    BackendClient::new(
        &cfg.backend.url,
        &cfg.backend.anon_key,
        Duration::from_secs(cfg.backend.timeout_secs),
    )
    .context("building backend HTTP client")
}
