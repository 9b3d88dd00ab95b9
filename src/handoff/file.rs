//! File-backed hand-off store
//!
//! Values for a run live in `<state_dir>/runs/<run_id>/handoff.json`, so a
//! stage started as its own process can pick up what an earlier process
//! handed off under the same run id. Every `put` holds `handoff.json.lock`
//! for its read-modify-write, and the document is replaced by rename, so
//! concurrent writers never drop each other's keys and readers never see a
//! half-written file.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, trace};

use super::lock::{RunLock, DEFAULT_LOCK_TIMEOUT};
use super::HandOff;
use crate::error::{ErrorCode, ErrorExt, PipelineError, Result};
use crate::storage;

const HANDOFF_FILE: &str = "handoff.json";
const LOCK_FILE: &str = "handoff.json.lock";

/// On-disk layout of a run's hand-off values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandOffDocument {
    pub run_id: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

/// Hand-off store persisted as one JSON document per run
#[derive(Debug)]
pub struct FileHandOff {
    run_id: String,
    run_dir: PathBuf,
    lock_timeout: Duration,
}

impl FileHandOff {
    /// Store for `run_id` under `state_dir`; nothing is created until the first `put`
    pub fn new(state_dir: impl AsRef<Path>, run_id: impl Into<String>) -> Result<Self> {
        let run_id = run_id.into();
        validate_run_id(&run_id)?;
        let run_dir = state_dir.as_ref().join("runs").join(&run_id);
        Ok(Self {
            run_id,
            run_dir,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// How long a `put` waits for another writer before failing
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Path of the JSON document backing this run
    pub fn path(&self) -> PathBuf {
        self.run_dir.join(HANDOFF_FILE)
    }

    async fn load(&self) -> Result<Option<HandOffDocument>> {
        let path = self.path();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).to_io_error(
                    ErrorCode::IO_READ_FAILED,
                    "Failed to read hand-off store",
                    &path,
                )
            }
        };

        let document = serde_json::from_str(&content).map_err(|e| {
            PipelineError::handoff(
                ErrorCode::HANDOFF_STORE_CORRUPTED,
                format!("{} is not a valid hand-off document", path.display()),
                None,
            )
            .with_source(e)
        })?;
        Ok(Some(document))
    }

    async fn save(&self, document: &HandOffDocument) -> Result<()> {
        let json = serde_json::to_vec_pretty(document)
            .to_handoff_error("Failed to serialize hand-off document")?;
        storage::write_atomic(&self.path(), json)
            .await
            .map_err(|e| e.with_context("hand-off store"))
    }

    async fn update(&self, key: &str, value: Value) -> Result<()> {
        let mut document = self.load().await?.unwrap_or_else(|| HandOffDocument {
            run_id: self.run_id.clone(),
            updated_at: Utc::now(),
            values: BTreeMap::new(),
        });
        document.values.insert(key.to_string(), value);
        document.updated_at = Utc::now();
        self.save(&document).await
    }
}

#[async_trait]
impl HandOff for FileHandOff {
    async fn put(&self, key: &str, value: Value) -> Result<()> {
        fs::create_dir_all(&self.run_dir).await.to_io_error(
            ErrorCode::IO_CREATE_DIR_FAILED,
            "Failed to create run directory",
            &self.run_dir,
        )?;

        let lock = RunLock::acquire(self.run_dir.join(LOCK_FILE), self.lock_timeout).await?;
        let updated = self.update(key, value).await;
        let released = lock.release().await;
        updated.and(released)?;

        debug!(run_id = %self.run_id, key, "Handed off value");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value = self
            .load()
            .await?
            .and_then(|mut document| document.values.remove(key));
        trace!(run_id = %self.run_id, key, found = value.is_some(), "Hand-off lookup");
        Ok(value)
    }
}

fn validate_run_id(run_id: &str) -> Result<()> {
    let valid = !run_id.is_empty()
        && run_id != "."
        && run_id != ".."
        && run_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(PipelineError::invalid_argument(
            ErrorCode::ARGUMENT_GENERIC,
            format!("'{}' is not a usable run id", run_id),
            "run_id",
        ))
    }
}
