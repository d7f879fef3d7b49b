use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of data transfer being accounted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Read,
    Write,
    FileExport,
    FileDownload,
    Auth,
    Settings,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Read,
        OperationKind::Write,
        OperationKind::FileExport,
        OperationKind::FileDownload,
        OperationKind::Auth,
        OperationKind::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "READ",
            OperationKind::Write => "WRITE",
            OperationKind::FileExport => "FILE_EXPORT",
            OperationKind::FileDownload => "FILE_DOWNLOAD",
            OperationKind::Auth => "AUTH",
            OperationKind::Settings => "SETTINGS",
        }
    }

    /// Human-readable name for reports
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Read => "Database reads",
            OperationKind::Write => "Database writes",
            OperationKind::FileExport => "File exports",
            OperationKind::FileDownload => "File downloads",
            OperationKind::Auth => "Authentication",
            OperationKind::Settings => "Settings",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = anyhow::Error;

    /// Accepts `FILE_EXPORT`, `file_export` and `file-export` alike
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown operation kind: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

/// Typed extra detail attached to a log entry, one shape per kind of event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EgressMetadata {
    DataFetch {
        record_count: usize,
    },
    FileExport {
        company_name: String,
        export_type: String,
    },
    FileDownload {
        file_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_type: Option<String>,
    },
}

/// What a caller knows about a transfer before it is stamped and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct EgressLogInput {
    pub operation: OperationKind,
    pub resource_name: Option<String>,
    pub size_bytes: u64,
    pub endpoint: String,
    /// Defaults to GET
    pub method: Option<HttpMethod>,
    pub response_time_ms: Option<u64>,
    /// Defaults to 200
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub metadata: Option<EgressMetadata>,
}

impl EgressLogInput {
    pub fn new(operation: OperationKind, size_bytes: u64, endpoint: impl Into<String>) -> Self {
        Self {
            operation,
            resource_name: None,
            size_bytes,
            endpoint: endpoint.into(),
            method: None,
            response_time_ms: None,
            status_code: None,
            error_message: None,
            metadata: None,
        }
    }
}

/// A stored egress record. Append-only: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EgressLogEntry {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "operation_type")]
    pub operation: OperationKind,
    #[serde(rename = "table_name", default)]
    pub resource_name: Option<String>,
    #[serde(rename = "data_size_bytes")]
    pub size_bytes: u64,
    pub endpoint: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    pub status_code: u16,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: Option<EgressMetadata>,
    #[serde(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
}

impl EgressLogEntry {
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
