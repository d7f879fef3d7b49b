pub mod logger;
pub mod summary;
pub mod types;

pub use logger::{payload_size, EgressLogger};
pub use summary::{format_bytes, summarize, window_entries, EgressSummary, OperationStats, TimeWindow};
pub use types::{EgressLogEntry, EgressLogInput, EgressMetadata, HttpMethod, OperationKind};
