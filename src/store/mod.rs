mod error;
pub mod json_file;
pub mod memory;

pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::egress::{EgressLogEntry, TimeWindow};
use crate::identity::Identity;
use crate::results::DiagnosticResult;

/// Persistence of diagnostic results, scoped to a user.
pub trait ResultStore {
    /// Store a new result and return the id assigned to it
    fn persist_result(&self, identity: &Identity, result: &DiagnosticResult) -> Result<String, StoreError>;

    /// Replace a stored result wholesale (matched by id and owner)
    fn replace_result(&self, identity: &Identity, result: &DiagnosticResult) -> Result<(), StoreError>;

    /// All results of the user, newest first
    fn load_results_for_user(&self, identity: &Identity) -> Result<Vec<DiagnosticResult>, StoreError>;
}

/// Append-only storage of egress log entries.
pub trait EgressLogStore {
    fn append_log(&self, entry: &EgressLogEntry) -> Result<(), StoreError>;

    /// Entries of the user whose timestamp falls inside `window`
    fn load_logs(&self, identity: &Identity, window: &TimeWindow) -> Result<Vec<EgressLogEntry>, StoreError>;
}
