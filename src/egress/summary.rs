use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::types::{EgressLogEntry, OperationKind};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Half-open time range `[start, end)` over which logs are summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
}

impl TimeWindow {
    /// The `span` leading up to `now`, e.g. "last 30 days"
    pub fn last(span: Duration, now: DateTime<Utc>) -> Self {
        let start = chrono::Duration::from_std(span)
            .ok()
            .and_then(|d| now.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let secs = span.as_secs();
        let description = if secs > 0 && secs % SECS_PER_DAY == 0 && span.subsec_nanos() == 0 {
            match secs / SECS_PER_DAY {
                1 => "last 1 day".to_string(),
                days => format!("last {} days", days),
            }
        } else {
            format!("last {}", humantime::format_duration(span))
        };

        Self {
            start,
            end: now,
            description,
        }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            description: format!(
                "{} to {}",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M")
            ),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

/// Count and volume of one operation kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    pub count: u64,
    pub bytes: u64,
}

/// Usage over a window. Derived on every request, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EgressSummary {
    pub total_bytes: u64,
    pub total_mb: f64,
    pub total_gb: f64,
    pub per_operation: BTreeMap<OperationKind, OperationStats>,
    pub window_description: String,
}

/// Aggregate the entries that fall inside `window`.
///
/// An empty entry set is not an error; it yields an all-zero summary.
pub fn summarize(entries: &[EgressLogEntry], window: &TimeWindow) -> EgressSummary {
    let mut total_bytes: u64 = 0;
    let mut per_operation: BTreeMap<OperationKind, OperationStats> = BTreeMap::new();

    for entry in entries.iter().filter(|e| window.contains(e.timestamp)) {
        total_bytes = total_bytes.saturating_add(entry.size_bytes);
        let stats = per_operation.entry(entry.operation).or_default();
        stats.count += 1;
        stats.bytes = stats.bytes.saturating_add(entry.size_bytes);
    }

    let total_mb = total_bytes as f64 / BYTES_PER_MB;
    EgressSummary {
        total_bytes,
        total_mb,
        total_gb: total_mb / 1024.0,
        per_operation,
        window_description: window.description.clone(),
    }
}

/// In-window entries, optionally of a single kind, newest first
pub fn window_entries<'a>(
    entries: &'a [EgressLogEntry],
    window: &TimeWindow,
    operation: Option<OperationKind>,
) -> Vec<&'a EgressLogEntry> {
    let mut selected: Vec<&EgressLogEntry> = entries
        .iter()
        .filter(|e| window.contains(e.timestamp))
        .filter(|e| operation.map_or(true, |op| e.operation == op))
        .collect();
    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    selected
}

/// Human-readable byte count: "0 Bytes", "1.5 KB", "3.25 MB".
///
/// Uses base-1024 units up to GB and at most two decimals, trailing zeros
/// dropped.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
