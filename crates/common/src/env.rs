//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Warn when the static frontend directory is missing and create every data directory.
pub async fn ensure_env<P: AsRef<Path>>(static_dir: &str, data_dirs: &[P]) -> anyhow::Result<()> {
    if tokio::fs::metadata(static_dir).await.is_err() {
        warn!(%static_dir, "frontend assets directory not found; page routes will 404");
    }
    for dir in data_dirs {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_data_dirs() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("hls_env_{}", std::process::id()));
        let nested = root.join("content").join("deep");
        ensure_env("/nonexistent-frontend", &[&nested]).await?;
        assert!(tokio::fs::metadata(&nested).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
