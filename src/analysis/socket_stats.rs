//! Socket-statistics log parsing.
//!
//! `ss -ti` style output is free-form, so values are picked out with
//! permissive patterns: the first `rtt` and the first `cwnd` value of each
//! line are collected.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::types::SocketStats;
use crate::utils::stats::mean;

/// Compiled regex patterns for socket-statistics lines
pub struct SocketPatterns {
    /// Match: "rtt:12.5/3.1", "rtt=12.5", "rtt 12.5"
    pub rtt: Regex,
    /// Match: "cwnd:10", "cwnd=10", "cwnd 10"
    pub cwnd: Regex,
}

impl SocketPatterns {
    pub fn new() -> Self {
        Self {
            rtt: Regex::new(r"rtt[:=]?\s*([0-9]+(?:\.[0-9]+)?)").expect("Invalid rtt regex"),
            cwnd: Regex::new(r"cwnd[:=]?\s*(\d+)").expect("Invalid cwnd regex"),
        }
    }
}

impl Default for SocketPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Global patterns instance
pub static PATTERNS: LazyLock<SocketPatterns> = LazyLock::new(SocketPatterns::new);

/// Collected per-line samples before averaging
#[derive(Debug, Default)]
struct Samples {
    rtts: Vec<f64>,
    cwnds: Vec<f64>,
}

impl Samples {
    fn scan_line(&mut self, line: &str) {
        if !line.contains("rtt") && !line.contains("cwnd") {
            return;
        }

        if let Some(value) = PATTERNS
            .rtt
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            self.rtts.push(value);
        }

        if let Some(value) = PATTERNS
            .cwnd
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
        {
            self.cwnds.push(value as f64);
        }
    }

    fn finish(self) -> SocketStats {
        SocketStats {
            avg_rtt_ms: mean(&self.rtts),
            avg_cwnd_kb: mean(&self.cwnds) / 1024.0,
        }
    }
}

/// Parse socket-statistics text already held in memory
pub fn parse_socket_stats(content: &str) -> SocketStats {
    let mut samples = Samples::default();
    for line in content.lines() {
        samples.scan_line(line);
    }
    samples.finish()
}

/// Parse a socket-statistics log file.
///
/// A missing file, or one without any match, yields zeros.
pub fn parse_socket_stats_file(path: &Path) -> SocketStats {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => {
            log::debug!("No socket statistics at {}", path.display());
            return SocketStats::default();
        }
    };

    let mut samples = Samples::default();
    for line_result in BufReader::new(file).lines() {
        let line = match line_result {
            Ok(l) => l,
            Err(_) => continue, // Skip malformed lines
        };
        samples.scan_line(&line);
    }
    samples.finish()
}
