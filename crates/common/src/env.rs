//! Startup environment checks.

use std::path::Path;

use tracing::{info, warn};

/// Verify the runtime environment before serving.
///
/// The frontend bundle is optional (API-only deployments run without it),
/// so a missing assets directory is only a warning. The store file's parent
/// directory is created up front so first writes cannot fail on a missing
/// directory.
pub async fn ensure_env(assets_dir: &Path, store_file: &Path) -> anyhow::Result<()> {
    if tokio::fs::metadata(assets_dir).await.is_err() {
        warn!(
            assets_dir = %assets_dir.display(),
            "frontend bundle not found; client routes will get the fallback notice"
        );
    }
    if let Some(parent) = store_file.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        }
    }
    info!(store_file = %store_file.display(), "data store location resolved");
    Ok(())
}
