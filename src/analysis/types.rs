//! Core data types for experiment summaries.
//!
//! Every table emitted by this crate has an explicitly declared, ordered
//! column list defined next to the row type it serializes.

use crate::capture::{CaptureMetrics, CaptureRole, CaptureSummary};

/// Averages extracted from a socket-statistics log
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SocketStats {
    pub avg_rtt_ms: f64,
    /// Raw congestion-window values divided by 1024
    pub avg_cwnd_kb: f64,
}

/// Average receive/transmit rates from an interface-statistics log (KB/s)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InterfaceRates {
    pub rx_kbps: f64,
    pub tx_kbps: f64,
}

impl InterfaceRates {
    /// Transmit rate converted from KB/s to Mbps
    pub fn tx_mbps(&self) -> f64 {
        self.tx_kbps * 8.0 / 1000.0
    }
}

/// Metric columns shared by capture records and their averages, in output order
pub const CAPTURE_METRIC_COLUMNS: [&str; 7] = [
    "rtt_avg_ms",
    "rtt_std_ms",
    "cwnd_avg_kB",
    "gap_avg_ms",
    "ack_interval_avg_ms",
    "ss_avg_rtt_ms",
    "ss_avg_cwnd",
];

/// One row of `pcap_summary.csv`
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub pcap: String,
    pub role: CaptureRole,
    pub scenario: String,
    pub run: String,
    pub metrics: CaptureMetrics,
    pub socket: SocketStats,
}

impl CaptureRecord {
    pub fn new(summary: CaptureSummary, scenario: &str, run: &str, socket: SocketStats) -> Self {
        Self {
            pcap: summary.pcap,
            role: summary.role,
            scenario: scenario.to_string(),
            run: run.to_string(),
            metrics: summary.metrics,
            socket,
        }
    }

    /// Metric values aligned with [`CAPTURE_METRIC_COLUMNS`]
    pub fn metric_values(&self) -> [f64; 7] {
        [
            self.metrics.rtt_avg_ms,
            self.metrics.rtt_std_ms,
            self.metrics.cwnd_avg_kb,
            self.metrics.gap_avg_ms,
            self.metrics.ack_interval_avg_ms,
            self.socket.avg_rtt_ms,
            self.socket.avg_cwnd_kb,
        ]
    }
}

/// Capture metrics averaged over one run, or over the runs of a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureAverage {
    pub scenario: String,
    /// Aligned with [`CAPTURE_METRIC_COLUMNS`]
    pub values: [f64; 7],
    /// Number of contributing captures
    pub n_pcaps: usize,
}

impl CaptureAverage {
    pub fn value(&self, column: &str) -> Option<f64> {
        CAPTURE_METRIC_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|idx| self.values[idx])
    }
}

/// Protocol-specific metric columns of a run summary, in output order
pub const RUN_METRIC_COLUMNS: [&str; 9] = [
    "tcp_avg_bw_Mbps",
    "tcp_fairness",
    "tcp_avg_retrans",
    "udp_avg_bw_Mbps",
    "udp_avg_lost_pct",
    "udp_avg_jitter_ms",
    "client_bw",
    "bottleneck_bw",
    "server_bw",
];

/// One row of `summary.csv`.
///
/// `None` marks a metric the run had no data for; it is written as an empty
/// cell and ignored when averaging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub tcp_avg_bw_mbps: Option<f64>,
    pub tcp_fairness: Option<f64>,
    pub tcp_avg_retrans: Option<f64>,
    pub udp_avg_bw_mbps: Option<f64>,
    pub udp_avg_lost_pct: Option<f64>,
    pub udp_avg_jitter_ms: Option<f64>,
    pub client_bw: Option<f64>,
    pub bottleneck_bw: Option<f64>,
    pub server_bw: Option<f64>,
}

impl RunSummary {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    /// Values aligned with [`RUN_METRIC_COLUMNS`]
    pub fn values(&self) -> [Option<f64>; 9] {
        [
            self.tcp_avg_bw_mbps,
            self.tcp_fairness,
            self.tcp_avg_retrans,
            self.udp_avg_bw_mbps,
            self.udp_avg_lost_pct,
            self.udp_avg_jitter_ms,
            self.client_bw,
            self.bottleneck_bw,
            self.server_bw,
        ]
    }

    pub fn from_values(run_id: impl Into<String>, v: [Option<f64>; 9]) -> Self {
        Self {
            run_id: run_id.into(),
            tcp_avg_bw_mbps: v[0],
            tcp_fairness: v[1],
            tcp_avg_retrans: v[2],
            udp_avg_bw_mbps: v[3],
            udp_avg_lost_pct: v[4],
            udp_avg_jitter_ms: v[5],
            client_bw: v[6],
            bottleneck_bw: v[7],
            server_bw: v[8],
        }
    }

    /// Whether the run contributed TCP results
    pub fn has_tcp(&self) -> bool {
        self.tcp_avg_bw_mbps.is_some()
    }

    pub fn has_udp(&self) -> bool {
        self.udp_avg_bw_mbps.is_some()
    }

    /// Store the link throughput measured for a role
    pub fn set_link_bw(&mut self, role: CaptureRole, mbps: f64) {
        match role {
            CaptureRole::Client => self.client_bw = Some(mbps),
            CaptureRole::Bottleneck => self.bottleneck_bw = Some(mbps),
            CaptureRole::Server => self.server_bw = Some(mbps),
        }
    }
}

/// Per-run rows of one scenario plus their column-wise average
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub runs: Vec<RunSummary>,
    /// Row labelled `avg`
    pub average: RunSummary,
}
