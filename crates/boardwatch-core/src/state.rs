//! In-memory state store.
//!
//! Stands in for the board column during dry runs and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{BoardWatchError, Result};
use crate::traits::StateStore;

#[derive(Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a marker.
    pub fn with_value(self, item_id: &str, value: &str) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(item_id.to_string(), value.to_string());
        }
        self
    }

    /// Make subsequent writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far (including clears).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current raw value, empty string when unset.
    pub fn get(&self, item_id: &str) -> String {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(item_id).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    fn name(&self) -> &str { "memory" }

    async fn read(&self, item_id: &str) -> Result<Option<String>> {
        let value = self.get(item_id);
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    async fn write(&self, item_id: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BoardWatchError::write_failed(item_id, "memory store rejecting writes"));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|e| BoardWatchError::write_failed(item_id, e.to_string()))?;
        values.insert(item_id.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
