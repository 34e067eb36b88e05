// src/persistence/memory.rs
use super::KvBackend;
use crate::error::AppResult;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

/// In-process backend. Clones share the same map, which lets tests reopen a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryKv {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
