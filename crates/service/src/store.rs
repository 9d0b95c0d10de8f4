//! The document store.
//!
//! The entire application state is one JSON document in one file. Reads load
//! the whole document; writes replace the whole file. Concurrent writers are
//! handled optimistically: the client sends the `lastUpdated` value it based
//! its edit on, and a mismatch rejects the write with the full server
//! document so the client can merge. There are no in-process locks.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use tokio::fs;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::paths::StorePaths;

/// Base-version token value that bypasses the concurrency check.
pub const FORCE_TOKEN: &str = "force";

/// Whole-document store over the file the path resolver currently points at.
#[derive(Clone)]
pub struct DocumentStore {
    paths: StorePaths,
}

impl DocumentStore {
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// The file the store currently points at.
    pub async fn current_path(&self) -> PathBuf {
        self.paths.resolve().await
    }

    /// Load the full document. A store that was never written reads as `{}`.
    pub async fn read(&self) -> Result<Value, ServiceError> {
        let path = self.paths.resolve().await;
        load(&path).await
    }

    /// Replace the whole document.
    ///
    /// `base_version` is the client's view of `lastUpdated` when it loaded
    /// the document. When present and not [`FORCE_TOKEN`], it must match the
    /// stored value or the write is rejected with the full current document.
    /// `None`, an empty token, and the force token all mean last-writer-wins.
    ///
    /// Returns the new version stamp.
    pub async fn write(
        &self,
        mut candidate: Value,
        base_version: Option<&str>,
    ) -> Result<u64, ServiceError> {
        let path = self.paths.resolve().await;
        let current = load(&path).await?;

        if let Some(base) = base_version.filter(|b| !b.is_empty()) {
            if base != FORCE_TOKEN {
                let server_version = stored_version(&current);
                if server_version != base {
                    info!(
                        client_version = base,
                        %server_version,
                        "rejecting write: base version does not match stored document"
                    );
                    return Err(ServiceError::Conflict { server_data: current });
                }
            }
        }

        if !candidate.is_object() {
            return Err(ServiceError::Write(
                "document body must be a JSON object".into(),
            ));
        }
        let stamp = next_version(&current);
        candidate["lastUpdated"] = Value::from(stamp);

        persist(&path, &candidate).await.map_err(|e| {
            ServiceError::Write(format!("cannot persist {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), version = stamp, "document persisted");
        Ok(stamp)
    }

    /// Seed the file at `path` on first use. Idempotent: an existing file is
    /// left untouched. The seed lands whole or not at all.
    pub async fn ensure_store(&self, path: &Path) -> Result<(), ServiceError> {
        if fs::metadata(path).await.is_ok() {
            debug!(path = %path.display(), "document store already exists");
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ServiceError::Config(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }
        persist(path, &seed_document(now_ms())).await.map_err(|e| {
            ServiceError::Config(format!("cannot seed {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), "seeded new document store");
        Ok(())
    }
}

/// The first-run document: one administrative user, everything else empty.
pub fn seed_document(stamp: u64) -> Value {
    json!({
        "users": [{
            "id": "u1",
            "uid": "Admin",
            "firstName": "System",
            "lastName": "Admin",
            "functionTitle": "Administrator",
            "role": "Admin",
            "password": "admin"
        }],
        "teams": [],
        "meetings": [],
        "weeklyReports": [],
        "workingGroups": [],
        "notifications": [],
        "dismissedAlerts": {},
        "systemMessage": { "active": false, "content": "", "level": "info" },
        "notes": [],
        "lastUpdated": stamp
    })
}

async fn load(path: &Path) -> Result<Value, ServiceError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            ServiceError::Read(format!("{} is not valid JSON: {e}", path.display()))
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(json!({})),
        Err(e) => Err(ServiceError::Read(format!(
            "cannot read {}: {e}",
            path.display()
        ))),
    }
}

/// Write the serialized document next to the target and rename it into
/// place, so readers observe either the old file or the new one.
async fn persist(path: &Path, doc: &Value) -> io::Result<()> {
    let data = serde_json::to_vec_pretty(doc)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &data).await?;
    fs::rename(&tmp, path).await
}

/// Stored `lastUpdated` as a comparison string; absent reads as "0", the
/// implicit version of an empty store.
fn stored_version(doc: &Value) -> String {
    match doc.get("lastUpdated") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "0".to_string(),
    }
}

/// Next version stamp: wall-clock milliseconds, bumped past the stored
/// value so consecutive writes always strictly increase.
fn next_version(current: &Value) -> u64 {
    let prev = current.get("lastUpdated").and_then(Value::as_u64).unwrap_or(0);
    now_ms().max(prev + 1)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
