//! Per-capture timing metrics.
//!
//! Which metrics are measured depends on the capture role:
//!
//! | role       | gap | ACK interval | RTT / in-flight |
//! |------------|-----|--------------|-----------------|
//! | client     | yes | yes          | no              |
//! | bottleneck | yes | yes          | yes             |
//! | server     | no  | yes          | no              |
//!
//! Unmeasured fields stay at zero.

use std::fs;
use std::path::Path;

use super::query::{CaptureQuery, ACK_RTT, BYTES_IN_FLIGHT, FRAME_TIME_RELATIVE};
use super::role::{classify, CaptureRole, Classification};
use crate::config::Endpoints;
use crate::utils::stats::{mean, mean_interval_ms, sample_std};

/// Timing metrics of one capture, all zero when unmeasured
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaptureMetrics {
    pub rtt_avg_ms: f64,
    pub rtt_std_ms: f64,
    pub cwnd_avg_kb: f64,
    pub gap_avg_ms: f64,
    pub ack_interval_avg_ms: f64,
}

/// Metrics of one capture file together with its inferred role
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSummary {
    pub pcap: String,
    pub role: CaptureRole,
    pub metrics: CaptureMetrics,
}

/// Mean inter-packet gap over all packets matching the role filter
fn packet_gap_ms<Q: CaptureQuery + ?Sized>(query: &Q, path: &Path, class: &Classification) -> f64 {
    let table = query.query(path, &[FRAME_TIME_RELATIVE], &class.filter);
    mean_interval_ms(&table.column(FRAME_TIME_RELATIVE))
}

/// Mean ACK-to-ACK interval over ACK-flagged packets
fn ack_interval_ms<Q: CaptureQuery + ?Sized>(query: &Q, path: &Path, class: &Classification) -> f64 {
    let table = query.query(path, &[FRAME_TIME_RELATIVE], &class.ack_filter());
    mean_interval_ms(&table.column(FRAME_TIME_RELATIVE))
}

/// RTT mean/std (ms) and mean bytes in flight (KB).
///
/// Only packets carrying both an RTT sample and an in-flight count qualify.
fn rtt_and_inflight<Q: CaptureQuery + ?Sized>(
    query: &Q,
    path: &Path,
    class: &Classification,
) -> (f64, f64, f64) {
    let table = query.query(path, &[ACK_RTT, BYTES_IN_FLIGHT], &class.filter);
    if table.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let rtt = table.column(ACK_RTT);
    let inflight = table.column(BYTES_IN_FLIGHT);
    (
        mean(&rtt) * 1000.0,
        sample_std(&rtt) * 1000.0,
        mean(&inflight) / 1024.0,
    )
}

/// Compute the role-specific metrics of a capture.
pub fn extract_metrics<Q: CaptureQuery + ?Sized>(
    query: &Q,
    path: &Path,
    class: &Classification,
) -> CaptureMetrics {
    match class.role {
        CaptureRole::Client => CaptureMetrics {
            gap_avg_ms: packet_gap_ms(query, path, class),
            ack_interval_avg_ms: ack_interval_ms(query, path, class),
            ..CaptureMetrics::default()
        },
        CaptureRole::Bottleneck => {
            let (rtt_avg_ms, rtt_std_ms, cwnd_avg_kb) = rtt_and_inflight(query, path, class);
            CaptureMetrics {
                rtt_avg_ms,
                rtt_std_ms,
                cwnd_avg_kb,
                gap_avg_ms: packet_gap_ms(query, path, class),
                ack_interval_avg_ms: ack_interval_ms(query, path, class),
            }
        }
        CaptureRole::Server => CaptureMetrics {
            ack_interval_avg_ms: ack_interval_ms(query, path, class),
            ..CaptureMetrics::default()
        },
    }
}

/// Summarize one capture file.
///
/// Returns `None` for a missing or zero-byte file; a capture with no
/// qualifying packets still yields a zero-valued summary.
pub fn summarize_capture<Q: CaptureQuery + ?Sized>(
    query: &Q,
    path: &Path,
    endpoints: &Endpoints,
) -> Option<CaptureSummary> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => {}
        _ => {
            log::info!("Skipping missing or empty capture {}", path.display());
            return None;
        }
    }

    let pcap = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let class = classify(&pcap, endpoints);
    log::debug!("{} classified as {} (filter: {})", pcap, class.role, class.filter);

    let metrics = extract_metrics(query, path, &class);

    Some(CaptureSummary {
        pcap,
        role: class.role,
        metrics,
    })
}
