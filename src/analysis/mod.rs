//! Log parsing and hierarchical aggregation for experiment runs.
//!
//! This module turns socket-statistics logs, interface-statistics logs and
//! throughput-test results into run, scenario and global tables.

pub mod aggregate;
pub mod ifstat;
pub mod iperf;
pub mod report;
pub mod socket_stats;
pub mod types;

pub use types::*;
pub use aggregate::{
    average_captures_by_run, average_run_summaries, average_runs_by_scenario,
    global_capture_average, merge_duplicate_runs, summarize_run, summarize_scenario_runs,
};
pub use iperf::{load_iperf_result, parse_iperf_value, ThroughputResult};
pub use report::{read_run_summary_csv, ReportError};
pub use socket_stats::parse_socket_stats_file;
