//! Shared utilities: numeric helpers and external tool resolution.

pub mod binary;
pub mod stats;

pub use binary::{resolve_tool, validate_binary, validate_tool_spec, BinaryError};
pub use stats::{jain_fairness, mean, mean_interval_ms, mean_present, sample_std};
