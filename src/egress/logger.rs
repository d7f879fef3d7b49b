use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::types::{EgressLogEntry, EgressLogInput, EgressMetadata, HttpMethod, OperationKind};
use crate::identity::Identity;
use crate::store::EgressLogStore;

const DEFAULT_STATUS_CODE: u16 = 200;

/// Records egress events on a best-effort basis.
///
/// Recording never fails from the caller's point of view: a missing identity
/// makes the call a no-op and store errors are traced and dropped. Inside a
/// Tokio runtime the write runs on the blocking pool so the caller can return
/// its own result first; [`EgressLogger::flush`] waits for those writes.
/// Nothing is retried.
pub struct EgressLogger<S> {
    store: Arc<S>,
    user_agent: String,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl<S> EgressLogger<S>
where
    S: EgressLogStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Record one transfer on behalf of `identity`.
    pub fn record(&self, identity: Option<&Identity>, input: EgressLogInput) {
        let Some(identity) = identity else {
            debug!(operation = %input.operation, "no identity, egress not recorded");
            return;
        };

        let entry = self.entry_for(identity, input);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = Arc::clone(&self.store);
                let task = handle.spawn_blocking(move || write_entry(store.as_ref(), &entry));
                match self.pending.lock() {
                    Ok(mut pending) => {
                        pending.retain(|h| !h.is_finished());
                        pending.push(task);
                    }
                    Err(_) => debug!("egress task list poisoned, write left detached"),
                }
            }
            Err(_) => write_entry(self.store.as_ref(), &entry),
        }
    }

    /// Wait for writes started by [`EgressLogger::record`] inside a runtime.
    pub async fn flush(&self) {
        let tasks = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };

        for outcome in futures::future::join_all(tasks).await {
            if let Err(e) = outcome {
                warn!(error = %e, "egress write task failed");
            }
        }
    }

    /// READ of structured data, sized as its JSON encoding.
    pub fn log_data_fetch<T>(
        &self,
        identity: Option<&Identity>,
        resource: &str,
        payload: &T,
        response_time: Option<Duration>,
    ) where
        T: Serialize + ?Sized,
    {
        self.log_data(identity, OperationKind::Read, HttpMethod::Get, resource, payload, response_time);
    }

    /// WRITE of structured data, sized as its JSON encoding.
    pub fn log_data_write<T>(
        &self,
        identity: Option<&Identity>,
        resource: &str,
        payload: &T,
        response_time: Option<Duration>,
    ) where
        T: Serialize + ?Sized,
    {
        self.log_data(identity, OperationKind::Write, HttpMethod::Post, resource, payload, response_time);
    }

    /// FILE_EXPORT of a produced artifact of `size_bytes`.
    pub fn log_file_export(
        &self,
        identity: Option<&Identity>,
        size_bytes: u64,
        company_name: &str,
        response_time: Option<Duration>,
    ) {
        let mut input = EgressLogInput::new(OperationKind::FileExport, size_bytes, "/file-export");
        input.method = Some(HttpMethod::Post);
        input.response_time_ms = response_time.map(duration_ms);
        input.metadata = Some(EgressMetadata::FileExport {
            company_name: company_name.to_string(),
            export_type: "diagnostic_report".to_string(),
        });
        self.record(identity, input);
    }

    /// FILE_DOWNLOAD of a stored file.
    pub fn log_file_download(
        &self,
        identity: Option<&Identity>,
        file_name: &str,
        size_bytes: u64,
        response_time: Option<Duration>,
    ) {
        let mut input = EgressLogInput::new(
            OperationKind::FileDownload,
            size_bytes,
            format!("/storage/v1/object/{}", file_name),
        );
        input.resource_name = Some("storage".to_string());
        input.method = Some(HttpMethod::Get);
        input.response_time_ms = response_time.map(duration_ms);
        input.metadata = Some(EgressMetadata::FileDownload {
            file_name: file_name.to_string(),
            file_type: Path::new(file_name)
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned()),
        });
        self.record(identity, input);
    }

    fn log_data<T>(
        &self,
        identity: Option<&Identity>,
        operation: OperationKind,
        method: HttpMethod,
        resource: &str,
        payload: &T,
        response_time: Option<Duration>,
    ) where
        T: Serialize + ?Sized,
    {
        if identity.is_none() {
            return;
        }

        let (size_bytes, record_count) = match serde_json::to_value(payload) {
            Ok(value) => (value_size(&value), value.as_array().map_or(1, Vec::len)),
            Err(e) => {
                warn!(error = %e, resource, "could not size egress payload");
                (0, 0)
            }
        };

        let mut input =
            EgressLogInput::new(operation, size_bytes, format!("/rest/v1/{}", resource));
        input.resource_name = Some(resource.to_string());
        input.method = Some(method);
        input.response_time_ms = response_time.map(duration_ms);
        input.metadata = Some(EgressMetadata::DataFetch { record_count });
        self.record(identity, input);
    }

    fn entry_for(&self, identity: &Identity, input: EgressLogInput) -> EgressLogEntry {
        EgressLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: identity.user_id().to_string(),
            operation: input.operation,
            resource_name: input.resource_name,
            size_bytes: input.size_bytes,
            endpoint: input.endpoint,
            method: input.method.unwrap_or_default(),
            user_agent: Some(self.user_agent.clone()),
            response_time_ms: input.response_time_ms,
            status_code: input.status_code.unwrap_or(DEFAULT_STATUS_CODE),
            error_message: input.error_message,
            metadata: input.metadata,
            timestamp: Utc::now(),
        }
    }
}

fn write_entry<S: EgressLogStore + ?Sized>(store: &S, entry: &EgressLogEntry) {
    match store.append_log(entry) {
        Ok(()) => debug!(
            operation = %entry.operation,
            bytes = entry.size_bytes,
            "egress logged"
        ),
        Err(e) => warn!(error = %e, operation = %entry.operation, "failed to record egress"),
    }
}

/// Size in bytes of the JSON encoding of `payload`; 0 for empty
/// (null, false, zero, "") or unserializable payloads.
pub fn payload_size<T: Serialize + ?Sized>(payload: &T) -> u64 {
    match serde_json::to_value(payload) {
        Ok(value) => value_size(&value),
        Err(e) => {
            warn!(error = %e, "could not size egress payload");
            0
        }
    }
}

/// Empty payloads (null, false, zero, "") size to 0
fn value_size(value: &serde_json::Value) -> u64 {
    use serde_json::Value;

    let empty = match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if empty {
        return 0;
    }
    serde_json::to_vec(value).map_or(0, |bytes| bytes.len() as u64)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
