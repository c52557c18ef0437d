//! Throughput-test (iperf3 JSON) result parsing.
//!
//! Records are navigated as generic JSON values since the layout differs
//! between protocols, between per-stream and aggregate reports, and between
//! iperf3 versions.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::utils::stats::mean;

/// TCP results of one test run
#[derive(Debug, Clone, PartialEq)]
pub struct TcpResult {
    /// Receiver-side bandwidth of each flow in Mbps
    pub per_flow_mbps: Vec<f64>,
    /// Sender-side retransmits averaged over flows
    pub avg_retransmits: f64,
}

/// UDP results of one test run
#[derive(Debug, Clone, PartialEq)]
pub struct UdpResult {
    pub per_flow_mbps: Vec<f64>,
    pub avg_lost_pct: f64,
    pub avg_jitter_ms: f64,
}

/// A parsed test-result record
#[derive(Debug, Clone, PartialEq)]
pub enum ThroughputResult {
    Tcp(TcpResult),
    Udp(UdpResult),
}

impl ThroughputResult {
    pub fn per_flow_mbps(&self) -> &[f64] {
        match self {
            ThroughputResult::Tcp(r) => &r.per_flow_mbps,
            ThroughputResult::Udp(r) => &r.per_flow_mbps,
        }
    }
}

fn number(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(|v| v.as_f64())
}

fn parse_tcp(end: &Value) -> TcpResult {
    let mut per_flow_mbps = Vec::new();
    let mut retransmits = Vec::new();

    if let Some(streams) = end.get("streams").and_then(|v| v.as_array()) {
        for stream in streams {
            let receiver = stream.get("receiver").unwrap_or(&Value::Null);
            let sender = stream.get("sender").unwrap_or(&Value::Null);
            if let Some(bps) = number(receiver, "bits_per_second") {
                per_flow_mbps.push(bps / 1e6);
                retransmits.push(number(sender, "retransmits").unwrap_or(0.0));
            }
        }
    } else if let Some(received) = end.get("sum_received") {
        let sent = end.get("sum_sent").unwrap_or(&Value::Null);
        per_flow_mbps.push(number(received, "bits_per_second").unwrap_or(0.0) / 1e6);
        retransmits.push(number(sent, "retransmits").unwrap_or(0.0));
    }

    TcpResult {
        per_flow_mbps,
        avg_retransmits: mean(&retransmits),
    }
}

fn parse_udp(end: &Value) -> UdpResult {
    let mut per_flow_mbps = Vec::new();
    let mut lost = Vec::new();
    let mut jitter = Vec::new();

    if let Some(streams) = end.get("streams").and_then(|v| v.as_array()) {
        for stream in streams {
            let udp = stream.get("udp").unwrap_or(&Value::Null);
            if let Some(bps) = number(udp, "bits_per_second") {
                per_flow_mbps.push(bps / 1e6);
                lost.push(number(udp, "lost_percent").unwrap_or(0.0));
                jitter.push(number(udp, "jitter_ms").unwrap_or(0.0));
            }
        }
    } else if let Some(sum) = end.get("sum") {
        per_flow_mbps.push(number(sum, "bits_per_second").unwrap_or(0.0) / 1e6);
        lost.push(number(sum, "lost_percent").unwrap_or(0.0));
        jitter.push(number(sum, "jitter_ms").unwrap_or(0.0));
    }

    UdpResult {
        per_flow_mbps,
        avg_lost_pct: mean(&lost),
        avg_jitter_ms: mean(&jitter),
    }
}

/// Parse a test-result record.
///
/// Returns `None` for records carrying an `error` field and for protocols
/// other than TCP or UDP.
pub fn parse_iperf_value(data: &Value) -> Option<ThroughputResult> {
    if data.get("error").is_some() {
        return None;
    }

    let protocol = data
        .get("start")
        .and_then(|v| v.get("test_start"))
        .and_then(|v| v.get("protocol"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_uppercase();
    let end = data.get("end").unwrap_or(&Value::Null);

    match protocol.as_str() {
        "TCP" => Some(ThroughputResult::Tcp(parse_tcp(end))),
        "UDP" => Some(ThroughputResult::Udp(parse_udp(end))),
        other => {
            log::debug!("Unrecognized protocol {:?} in test result", other);
            None
        }
    }
}

/// Load and parse a test-result file.
///
/// Unreadable or malformed files are logged and yield `None`.
pub fn load_iperf_result(path: &Path) -> Option<ThroughputResult> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Error reading {}: {}", path.display(), e);
            return None;
        }
    };

    let data: Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Error parsing {}: {}", path.display(), e);
            return None;
        }
    };

    parse_iperf_value(&data)
}
