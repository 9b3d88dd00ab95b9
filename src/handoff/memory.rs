//! In-process hand-off store

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::HandOff;
use crate::error::Result;

/// Hand-off store living for the duration of one in-process run
#[derive(Debug, Clone, Default)]
pub struct MemoryHandOff {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryHandOff {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HandOff for MemoryHandOff {
    async fn put(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_replaces_previous_value() {
        let handoff = MemoryHandOff::new();
        handoff.put("k", json!(1)).await.unwrap();
        handoff.put("k", json!(2)).await.unwrap();

        assert_eq!(handoff.get("k").await.unwrap(), Some(json!(2)));
        assert_eq!(handoff.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let handoff = MemoryHandOff::new();
        let clone = handoff.clone();
        clone.put("k", json!("v")).await.unwrap();
        assert_eq!(handoff.get("k").await.unwrap(), Some(json!("v")));
    }
}
