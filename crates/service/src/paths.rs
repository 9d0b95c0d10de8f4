//! Store path resolution.
//!
//! The store location is a pointer held in a small sidecar JSON record
//! (`server-config.json` by default). Reconfiguring the path rewrites the
//! record; it never migrates data between locations.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use crate::errors::ServiceError;

/// Sidecar config record. One recognized key holding the store path.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PathRecord {
    #[serde(rename = "dbPath", default, skip_serializing_if = "Option::is_none")]
    db_path: Option<String>,
}

/// Where the document store lives.
///
/// Threaded by value into every store call so resolution always reflects the
/// sidecar record's contents at call time; nothing is cached across a path
/// update.
#[derive(Debug, Clone)]
pub struct StorePaths {
    config_file: PathBuf,
    default_store: PathBuf,
}

impl StorePaths {
    pub fn new(config_file: impl Into<PathBuf>, default_store: impl Into<PathBuf>) -> Self {
        Self { config_file: config_file.into(), default_store: default_store.into() }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn default_store(&self) -> &Path {
        &self.default_store
    }

    /// Resolve the current store path.
    ///
    /// Infallible by contract: a missing record means "use the default", and
    /// an unreadable or malformed record falls back to the default as well,
    /// with a warning so misconfiguration stays visible in logs.
    pub async fn resolve(&self) -> PathBuf {
        match fs::read(&self.config_file).await {
            Ok(bytes) => match serde_json::from_slice::<PathRecord>(&bytes) {
                Ok(record) => match record.db_path.filter(|p| !p.trim().is_empty()) {
                    Some(path) => PathBuf::from(path),
                    None => self.default_store.clone(),
                },
                Err(e) => {
                    warn!(
                        config_file = %self.config_file.display(),
                        error = %e,
                        "malformed store config record; using default store path"
                    );
                    self.default_store.clone()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.default_store.clone(),
            Err(e) => {
                warn!(
                    config_file = %self.config_file.display(),
                    error = %e,
                    "cannot read store config record; using default store path"
                );
                self.default_store.clone()
            }
        }
    }

    /// Persist a new store path into the sidecar record and return it.
    pub async fn set_path(&self, new_path: &str) -> Result<PathBuf, ServiceError> {
        let record = PathRecord { db_path: Some(new_path.to_string()) };
        let data = serde_json::to_vec_pretty(&record)
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        if let Some(parent) = self.config_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.ok();
            }
        }
        fs::write(&self.config_file, data).await.map_err(|e| {
            ServiceError::Config(format!(
                "cannot persist {}: {e}",
                self.config_file.display()
            ))
        })?;
        Ok(PathBuf::from(new_path))
    }
}
