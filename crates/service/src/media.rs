use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::backend::object_storage::ObjectStorage;
use crate::backend::Caller;
use crate::errors::ServiceError;
use crate::metrics;

pub const DEFAULT_BUCKET: &str = "ib_images";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A file picked in an admin form.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Puts images into object storage and hands back their public URL.
#[derive(Clone)]
pub struct ImageUploader {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
    max_bytes: usize,
}

/// Random object name keeping the lower-cased extension of `filename`.
pub fn object_name(filename: &str) -> String {
    let stem = Uuid::new_v4().simple().to_string();
    match extension(filename) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn extension(filename: &str) -> Option<String> {
    let base = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    let (head, ext) = base.rsplit_once('.')?;
    if head.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn guess_content_type(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, e)| e) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

impl ImageUploader {
    pub fn new(storage: Arc<dyn ObjectStorage>, bucket: impl Into<String>, max_bytes: usize) -> Self {
        Self { storage, bucket: bucket.into(), max_bytes }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Upload one image as `caller` and return its public URL.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::backend::mock::MemoryObjectStorage;
    /// use service::backend::Caller;
    /// use service::media::{ImageFile, ImageUploader};
    ///
    /// let uploader = ImageUploader::new(Arc::new(MemoryObjectStorage::default()), "ib_images", 1024);
    /// let file = ImageFile { filename: "Anlage.PNG".into(), bytes: vec![1, 2, 3], content_type: None };
    /// let url = tokio_test::block_on(uploader.upload_image(Some(file), Caller::User("jwt"))).unwrap();
    /// assert!(url.starts_with("https://storage.test/ib_images/"));
    /// assert!(url.ends_with(".png"));
    /// ```
    #[instrument(skip(self, file, caller), fields(bucket = %self.bucket))]
    pub async fn upload_image(&self, file: Option<ImageFile>, caller: Caller<'_>) -> Result<String, ServiceError> {
        let res = self.try_upload(file, caller).await;
        metrics::IMAGE_UPLOADS_TOTAL.with_label_values(&[metrics::outcome(&res)]).inc();
        match &res {
            Ok(url) => info!(%url, "image_uploaded"),
            Err(e) => warn!(error = %e, "image upload failed"),
        }
        res
    }

    async fn try_upload(&self, file: Option<ImageFile>, caller: Caller<'_>) -> Result<String, ServiceError> {
        let file = file.ok_or_else(|| ServiceError::Validation("no file selected".into()))?;
        if file.bytes.is_empty() {
            return Err(ServiceError::Validation("file is empty".into()));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(ServiceError::Validation(format!(
                "file exceeds {} bytes",
                self.max_bytes
            )));
        }

        let name = object_name(&file.filename);
        let content_type = match file.content_type.as_deref() {
            Some(ct) if !ct.trim().is_empty() => ct.to_string(),
            _ => guess_content_type(&name).to_string(),
        };
        self.storage
            .upload(&self.bucket, &name, file.bytes, &content_type, caller)
            .await?;
        Ok(self.storage.public_url(&self.bucket, &name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MemoryObjectStorage;

    const ADMIN: Caller<'static> = Caller::User("admin-jwt");

    fn uploader(storage: Arc<MemoryObjectStorage>) -> ImageUploader {
        ImageUploader::new(storage, DEFAULT_BUCKET, 16)
    }

    fn file(name: &str, bytes: &[u8]) -> Option<ImageFile> {
        Some(ImageFile { filename: name.into(), bytes: bytes.to_vec(), content_type: Some("image/jpeg".into()) })
    }

    #[test]
    fn object_name_keeps_lowercased_extension() {
        let name = object_name("Baustelle.JPG");
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "jpg");
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(object_name("README").len(), 32);
        assert_eq!(object_name(".hidden").len(), 32);
        assert!(object_name("archiv.tar.GZ").ends_with(".gz"));
        assert_ne!(object_name("a.png"), object_name("a.png"));
    }

    #[test]
    fn content_type_guess_by_extension() {
        assert_eq!(guess_content_type("x.webp"), "image/webp");
        assert_eq!(guess_content_type("x"), "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_file_makes_no_storage_call() {
        let storage = Arc::new(MemoryObjectStorage::default());
        let err = uploader(storage.clone()).upload_image(None, ADMIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(storage.upload_calls(), 0);
    }

    #[tokio::test]
    async fn empty_or_oversized_files_are_rejected() {
        let storage = Arc::new(MemoryObjectStorage::default());
        let up = uploader(storage.clone());
        assert!(matches!(up.upload_image(file("a.png", b""), ADMIN).await, Err(ServiceError::Validation(_))));
        assert!(matches!(up.upload_image(file("a.png", &[0u8; 17]), ADMIN).await, Err(ServiceError::Validation(_))));
        assert_eq!(storage.upload_calls(), 0);
    }

    #[tokio::test]
    async fn upload_stores_bytes_under_returned_name() {
        let storage = Arc::new(MemoryObjectStorage::default());
        let url = uploader(storage.clone()).upload_image(file("foto.jpeg", b"jpegdata"), ADMIN).await.unwrap();
        let name = url.rsplit('/').next().unwrap();
        assert!(name.ends_with(".jpeg"));
        assert_eq!(storage.object(DEFAULT_BUCKET, name).as_deref(), Some(&b"jpegdata"[..]));
        assert_eq!(storage.upload_calls(), 1);
        assert_eq!(storage.last_access_token().as_deref(), Some("admin-jwt"));
    }
}
