//! # NetSummary - Metric extraction for network experiment artifacts
//!
//! This library reduces the raw output of a network test harness (packet
//! captures, socket-statistics logs, interface-statistics logs and iperf3
//! JSON results) into per-run, per-scenario and global CSV tables.
//!
//! ## Overview
//!
//! The harness lays out its results as `<root>/<scenario>/<run>/`. Two
//! independent passes walk that tree:
//!
//! - **Capture pass**: every selected capture is classified by vantage point
//!   (client, server or bottleneck), queried through `tshark`, and reduced to
//!   timing metrics (inter-packet gap, ACK interval, RTT, bytes in flight).
//! - **Throughput pass**: each run's `tcp.json`/`udp.json` and `ifstat_*`
//!   logs are reduced to bandwidth, fairness, loss, jitter and link rates.
//!
//! Averages are two-stage: captures are averaged per run first, then runs per
//! scenario, so scenarios with many captures do not dominate.
//!
//! ## Architecture
//!
//! - `config`: typed configuration (topology endpoints, tool path)
//! - `config_loader`: YAML loading and CLI overrides
//! - `capture`: capture query adapter, role classifier, metric extractor
//! - `analysis`: log/result parsers, aggregation and CSV reports
//! - `layout`: experiment directory discovery
//! - `orchestrator`: sequential batch driver
//! - `utils`: numeric helpers and tool resolution
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use netsummary::capture::TsharkQuery;
//! use netsummary::config::AnalysisConfig;
//! use netsummary::orchestrator::{run_analysis, AnalysisOptions};
//!
//! let config = AnalysisConfig::default();
//! let query = TsharkQuery::new(&config.tshark);
//! let outcome = run_analysis(Path::new("demo"), &config, &query, AnalysisOptions::default())?;
//! println!("{} captures summarized", outcome.capture_records.len());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Degraded inputs never abort the batch: missing files, failing tool runs
//! and malformed records turn into zero-valued or absent fields. Only a
//! missing root directory is reported as an error.

pub mod config;
pub mod config_loader;

pub mod analysis;
pub mod capture;
pub mod layout;
pub mod orchestrator;
pub mod utils;
