use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{EgressLogStore, ResultStore, StoreError};
use crate::egress::{EgressLogEntry, TimeWindow};
use crate::identity::Identity;
use crate::results::DiagnosticResult;

/// In-process record store.
///
/// Can be switched offline with [`MemoryStore::set_available`] to exercise
/// failure paths.
#[derive(Debug)]
pub struct MemoryStore {
    results: Mutex<Vec<(String, DiagnosticResult)>>,
    logs: Mutex<Vec<EgressLogEntry>>,
    next_id: AtomicU64,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Every log entry regardless of owner or time, in append order
    pub fn all_logs(&self) -> Vec<EgressLogEntry> {
        self.logs.lock().map(|logs| logs.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable("memory store is offline"))
        }
    }

    fn results(&self) -> Result<MutexGuard<'_, Vec<(String, DiagnosticResult)>>, StoreError> {
        self.check_available()?;
        self.results
            .lock()
            .map_err(|_| StoreError::unavailable("result store lock poisoned"))
    }

    fn logs(&self) -> Result<MutexGuard<'_, Vec<EgressLogEntry>>, StoreError> {
        self.check_available()?;
        self.logs
            .lock()
            .map_err(|_| StoreError::unavailable("log store lock poisoned"))
    }
}

impl ResultStore for MemoryStore {
    fn persist_result(&self, identity: &Identity, result: &DiagnosticResult) -> Result<String, StoreError> {
        let mut results = self.results()?;
        let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        results.push((identity.user_id().to_string(), result.clone().with_id(id.clone())));
        Ok(id)
    }

    fn replace_result(&self, identity: &Identity, result: &DiagnosticResult) -> Result<(), StoreError> {
        let id = result
            .id
            .as_deref()
            .ok_or_else(|| StoreError::NotFound("result has no id".to_string()))?;
        let mut results = self.results()?;
        let slot = results
            .iter_mut()
            .find(|(owner, stored)| owner == identity.user_id() && stored.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        slot.1 = result.clone();
        Ok(())
    }

    fn load_results_for_user(&self, identity: &Identity) -> Result<Vec<DiagnosticResult>, StoreError> {
        let results = self.results()?;
        let mut owned: Vec<DiagnosticResult> = results
            .iter()
            .filter(|(owner, _)| owner == identity.user_id())
            .map(|(_, result)| result.clone())
            .collect();
        owned.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(owned)
    }
}

impl EgressLogStore for MemoryStore {
    fn append_log(&self, entry: &EgressLogEntry) -> Result<(), StoreError> {
        self.logs()?.push(entry.clone());
        Ok(())
    }

    fn load_logs(&self, identity: &Identity, window: &TimeWindow) -> Result<Vec<EgressLogEntry>, StoreError> {
        Ok(self
            .logs()?
            .iter()
            .filter(|e| e.user_id == identity.user_id() && window.contains(e.timestamp))
            .cloned()
            .collect())
    }
}
