//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can call
//! `service::runtime::ensure_env` without depending on `common` directly.

use std::path::Path;

/// Check the assets directory and prepare the store file's directory.
pub async fn ensure_env(assets_dir: &Path, store_file: &Path) -> anyhow::Result<()> {
    common::env::ensure_env(assets_dir, store_file).await
}
