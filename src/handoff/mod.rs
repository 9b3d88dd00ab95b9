//! Run-scoped key-value hand-off between pipeline stages
//!
//! Stages never call each other directly. Each one reads what its upstream
//! stages [`put`](HandOff::put) and publishes its own output the same way,
//! which lets the stages run in one process ([`MemoryHandOff`]) or as
//! separate invocations sharing a run id ([`FileHandOff`]).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{common, Result};

pub mod file;
mod lock;
pub mod memory;

pub use file::FileHandOff;
pub use memory::MemoryHandOff;

/// Serialized video records (JSON string holding an array of records)
pub const VIDEOS_DATA: &str = "videos_data";
/// Category id to name mapping (JSON object)
pub const CATEGORY_MAP: &str = "category_map";
/// Path of the persisted enriched table (JSON string)
pub const SAVED_CSV_PATH: &str = "saved_csv_path";

/// Key-value store scoped to one pipeline run
#[async_trait]
pub trait HandOff: Send + Sync {
    /// Store a value, replacing any previous value under the key
    async fn put(&self, key: &str, value: Value) -> Result<()>;

    /// Fetch a value, `None` if nothing was stored under the key
    async fn get(&self, key: &str) -> Result<Option<Value>>;
}

/// Fetch a value that an upstream stage must have produced
pub async fn require(handoff: &dyn HandOff, key: &str) -> Result<Value> {
    handoff
        .get(key)
        .await?
        .ok_or_else(|| common::handoff_key_missing(key))
}
