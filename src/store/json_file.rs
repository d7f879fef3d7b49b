use atomic_write_file::AtomicWriteFile;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{EgressLogStore, ResultStore, StoreError};
use crate::egress::{EgressLogEntry, TimeWindow};
use crate::identity::Identity;
use crate::results::DiagnosticResult;

const STORE_VERSION: u32 = 1;
const RESULTS_FILE: &str = "diagnostic_results.json";
const EGRESS_LOGS_FILE: &str = "egress_logs.json";

/// Get the default data directory (~/.local/share/pillarscore/ on Linux)
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("pillarscore"))
        .unwrap_or_else(|| crate::config::get_config_dir().join("data"))
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredResult {
    user_id: String,
    #[serde(flatten)]
    result: DiagnosticResult,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResultsFile {
    version: u32,
    #[serde(default)]
    results: Vec<StoredResult>,
}

impl Default for ResultsFile {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EgressLogsFile {
    version: u32,
    #[serde(default)]
    entries: Vec<EgressLogEntry>,
}

impl Default for EgressLogsFile {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            entries: Vec::new(),
        }
    }
}

trait Versioned {
    fn version(&self) -> u32;
}

impl Versioned for ResultsFile {
    fn version(&self) -> u32 {
        self.version
    }
}

impl Versioned for EgressLogsFile {
    fn version(&self) -> u32 {
        self.version
    }
}

/// Record store backed by two JSON files in a data directory.
///
/// Every change rewrites the whole file atomically, so a crash never leaves a
/// half-written file behind. Read-modify-write cycles are serialized by an
/// internal lock; separate processes writing the same directory are not
/// coordinated.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn results_path(&self) -> PathBuf {
        self.dir.join(RESULTS_FILE)
    }

    fn logs_path(&self) -> PathBuf {
        self.dir.join(EGRESS_LOGS_FILE)
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::unavailable("store lock poisoned"))
    }

    fn load_results(&self) -> Result<ResultsFile, StoreError> {
        read_file(&self.results_path())
    }

    fn load_log_file(&self) -> Result<EgressLogsFile, StoreError> {
        read_file(&self.logs_path())
    }

    fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .map_err(|e| StoreError::io("failed to create data directory", &self.dir, e))?;
        }
        write_file(path, value)
    }
}

/// Load a store file. A missing file reads as empty.
fn read_file<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default + Versioned,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| StoreError::io("failed to open store file", path, e))?;

    let data: T = serde_json::from_reader(file)
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?;

    if data.version() != STORE_VERSION {
        return Err(StoreError::Corrupt(format!(
            "{}: unsupported store version {}",
            path.display(),
            data.version()
        )));
    }

    Ok(data)
}

/// Save a store file atomically
fn write_file<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut file = AtomicWriteFile::open(path)
        .map_err(|e| StoreError::io("failed to open atomic write file", path, e))?;

    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()
        .map_err(|e| StoreError::io("failed to write store file", path, e))?;

    file.commit()
        .map_err(|e| StoreError::io("failed to save store file", path, e))?;

    Ok(())
}

impl ResultStore for JsonFileStore {
    fn persist_result(&self, identity: &Identity, result: &DiagnosticResult) -> Result<String, StoreError> {
        let _guard = self.guard()?;
        let mut data = self.load_results()?;

        let id = uuid::Uuid::new_v4().to_string();
        data.results.push(StoredResult {
            user_id: identity.user_id().to_string(),
            result: result.clone().with_id(id.clone()),
        });

        self.save(&self.results_path(), &data)?;
        debug!(id = %id, user = %identity, "result persisted");
        Ok(id)
    }

    fn replace_result(&self, identity: &Identity, result: &DiagnosticResult) -> Result<(), StoreError> {
        let id = result
            .id
            .as_deref()
            .ok_or_else(|| StoreError::NotFound("result has no id".to_string()))?;

        let _guard = self.guard()?;
        let mut data = self.load_results()?;

        let stored = data
            .results
            .iter_mut()
            .find(|s| s.user_id == identity.user_id() && s.result.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        stored.result = result.clone();

        self.save(&self.results_path(), &data)?;
        debug!(id = %id, user = %identity, "result replaced");
        Ok(())
    }

    fn load_results_for_user(&self, identity: &Identity) -> Result<Vec<DiagnosticResult>, StoreError> {
        let _guard = self.guard()?;
        let data = self.load_results()?;

        let mut results: Vec<DiagnosticResult> = data
            .results
            .into_iter()
            .filter(|s| s.user_id == identity.user_id())
            .map(|s| s.result)
            .collect();
        results.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(results)
    }
}

impl EgressLogStore for JsonFileStore {
    fn append_log(&self, entry: &EgressLogEntry) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let mut data = self.load_log_file()?;
        data.entries.push(entry.clone());
        self.save(&self.logs_path(), &data)
    }

    fn load_logs(&self, identity: &Identity, window: &TimeWindow) -> Result<Vec<EgressLogEntry>, StoreError> {
        let _guard = self.guard()?;
        let data = self.load_log_file()?;
        Ok(data
            .entries
            .into_iter()
            .filter(|e| e.user_id == identity.user_id() && window.contains(e.timestamp))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::egress::{EgressLogger, EgressLogInput, OperationKind};
    use crate::results::{build_result_at, rescore_result, CompanyMetadata};
    use crate::scoring::{AnswerSet, AnswerValue};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    fn result_on(day: u32) -> DiagnosticResult {
        build_result_at(
            CompanyMetadata::named("Acme"),
            [("q1", AnswerValue::Yes)].into_iter().collect(),
            &[],
            Utc.with_ymd_and_hms(2026, 2, day, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        let identity = Identity::new("acme").unwrap();

        assert!(store.load_results_for_user(&identity).unwrap().is_empty());
        let window = TimeWindow::last(Duration::from_secs(3600), Utc::now());
        assert!(store.load_logs(&identity, &window).unwrap().is_empty());
    }

    #[test]
    fn test_persist_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        let identity = Identity::new("acme").unwrap();

        let first = store.persist_result(&identity, &result_on(1)).unwrap();
        let second = store.persist_result(&identity, &result_on(5)).unwrap();
        assert_ne!(first, second);

        // A fresh handle sees what the first one wrote
        let reopened = JsonFileStore::new(store.dir());
        let results = reopened.load_results_for_user(&identity).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id.as_deref(), Some(second.as_str()));
        assert_eq!(results[1].id.as_deref(), Some(first.as_str()));
        assert_eq!(results[1].answers, result_on(1).answers);
    }

    #[test]
    fn test_results_scoped_to_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let alice = Identity::new("alice").unwrap();
        let bob = Identity::new("bob").unwrap();

        store.persist_result(&alice, &result_on(1)).unwrap();
        assert!(store.load_results_for_user(&bob).unwrap().is_empty());
    }

    #[test]
    fn test_replace_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let identity = Identity::new("acme").unwrap();

        let id = store.persist_result(&identity, &result_on(1)).unwrap();
        let stored = store.load_results_for_user(&identity).unwrap().remove(0);

        let mut answers = AnswerSet::new();
        answers.insert("q1", AnswerValue::No);
        let edited = rescore_result(&stored, answers, &[]);
        store.replace_result(&identity, &edited).unwrap();

        let reloaded = store.load_results_for_user(&identity).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].id.as_deref(), Some(id.as_str()));
        assert_eq!(reloaded[0].answers.get("q1"), Some(&AnswerValue::No));
    }

    #[test]
    fn test_replace_unknown_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let identity = Identity::new("acme").unwrap();

        let err = store
            .replace_result(&identity, &result_on(1).with_id("missing"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
    }

    #[test]
    fn test_unsupported_version_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(RESULTS_FILE), r#"{"version": 9, "results": []}"#).unwrap();
        let store = JsonFileStore::new(dir.path());

        let err = store
            .load_results_for_user(&Identity::new("acme").unwrap())
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn test_garbage_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(EGRESS_LOGS_FILE), "not json").unwrap();
        let store = JsonFileStore::new(dir.path());

        let window = TimeWindow::last(Duration::from_secs(60), Utc::now());
        let err = store
            .load_logs(&Identity::new("acme").unwrap(), &window)
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_concurrent_log_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path()));
        let logger = EgressLogger::new(Arc::clone(&store));
        let identity = Identity::new("acme").unwrap();

        for size in 1..=10 {
            logger.record(Some(&identity), EgressLogInput::new(OperationKind::Read, size, "/x"));
        }
        logger.flush().await;

        let window = TimeWindow::last(Duration::from_secs(3600), Utc::now() + chrono::Duration::seconds(1));
        let logs = store.load_logs(&identity, &window).unwrap();
        assert_eq!(logs.len(), 10);
        assert_eq!(logs.iter().map(|e| e.size_bytes).sum::<u64>(), 55);
    }
}
