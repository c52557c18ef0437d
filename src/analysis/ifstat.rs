//! Interface-statistics (`ifstat`) log parsing.

use std::fs;
use std::path::{Path, PathBuf};

use super::types::InterfaceRates;
use crate::capture::CaptureRole;
use crate::utils::stats::mean;

/// Roles with an interface-statistics log, in output order
pub const LINK_ROLES: [CaptureRole; 3] = [
    CaptureRole::Client,
    CaptureRole::Bottleneck,
    CaptureRole::Server,
];

/// Parse ifstat output held in memory.
///
/// Data rows start with a digit (after optional whitespace) and carry the
/// receive rate in column 2 and the transmit rate in column 3, both in KB/s.
/// Header lines and rows with unparsable rates are skipped.
pub fn parse_ifstat(content: &str) -> InterfaceRates {
    let mut rx = Vec::new();
    let mut tx = Vec::new();

    for line in content.lines() {
        if !line.trim_start().starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }
        if let (Ok(r), Ok(t)) = (parts[1].parse::<f64>(), parts[2].parse::<f64>()) {
            rx.push(r);
            tx.push(t);
        }
    }

    InterfaceRates {
        rx_kbps: mean(&rx),
        tx_kbps: mean(&tx),
    }
}

/// Parse an ifstat log file, zeros if it cannot be read
pub fn parse_ifstat_file(path: &Path) -> InterfaceRates {
    match fs::read_to_string(path) {
        Ok(content) => parse_ifstat(&content),
        Err(e) => {
            log::debug!("Failed to read {}: {}", path.display(), e);
            InterfaceRates::default()
        }
    }
}

/// Locate `ifstat_<role>_*.log` in a run directory.
///
/// The lexicographically first match wins when several exist.
pub fn find_ifstat_log(run_dir: &Path, role: CaptureRole) -> Option<PathBuf> {
    let prefix = format!("ifstat_{}_", role.as_str());
    let entries = fs::read_dir(run_dir).ok()?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name.starts_with(&prefix) && name.ends_with(".log")
        })
        .map(|e| e.path())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const IFSTAT_SAMPLE: &str = "\
       eth0
 KB/s in  KB/s out
  100.00    250.00
  300.00    750.00
";

    #[test]
    fn test_parse_ifstat() {
        // Column 2 of a row is the first rate after the leading timestamp/index
        let rates = parse_ifstat("1 100.0 250.0\n2 300.0 750.0\n");
        assert_eq!(rates.rx_kbps, 200.0);
        assert_eq!(rates.tx_kbps, 500.0);
        assert_eq!(rates.tx_mbps(), 4.0);
    }

    #[test]
    fn test_two_column_rows_ignored() {
        // Plain two-column ifstat output lacks the third column
        let rates = parse_ifstat(IFSTAT_SAMPLE);
        assert_eq!(rates, InterfaceRates::default());
    }

    #[test]
    fn test_bad_rows_skipped() {
        let rates = parse_ifstat("header\n10 x 1.0\n11 4.0 8.0\n12 5.0\n");
        assert_eq!(rates.rx_kbps, 4.0);
        assert_eq!(rates.tx_kbps, 8.0);
    }

    #[test]
    fn test_find_ifstat_log() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ifstat_bottleneck_b.log"), "").unwrap();
        std::fs::write(dir.path().join("ifstat_bottleneck_a.log"), "").unwrap();
        std::fs::write(dir.path().join("ifstat_client.txt"), "").unwrap();

        let found = find_ifstat_log(dir.path(), CaptureRole::Bottleneck).unwrap();
        assert!(found.ends_with("ifstat_bottleneck_a.log"));
        assert!(find_ifstat_log(dir.path(), CaptureRole::Client).is_none());
        assert!(find_ifstat_log(&dir.path().join("missing"), CaptureRole::Server).is_none());
    }
}
