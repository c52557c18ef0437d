//! Capture analysis: query adapter, role classification, metric extraction.

pub mod metrics;
pub mod query;
pub mod role;

pub use metrics::{extract_metrics, summarize_capture, CaptureMetrics, CaptureSummary};
pub use query::{parse_field_output, CaptureQuery, FieldTable, QueryError, TsharkQuery};
pub use role::{classify, CaptureRole, Classification};
