//! Experiment directory layout.
//!
//! The harness writes `<root>/<scenario>/<run>/...`, where run directories
//! carry a `run<sep><N>` token. A root that directly contains run
//! directories is treated as a single scenario.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use color_eyre::eyre::{bail, Context, Result};
use regex::Regex;

/// Match: "run_3", "run-3", "run3", also embedded as in "fifo_run_3"
static RUN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"run[_-]?(\d+)").expect("Invalid run regex"));

/// Match: "bw3Mbps_multiflow_10_RED" -> 10
static FLOW_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d+)_").expect("Invalid flow regex"));

/// Socket-statistics log of a run
pub const SS_LOG_FILE: &str = "ss_client.txt";

/// Canonical run id (`run_<N>`), or the name unchanged if it has no run token
pub fn normalize_run_name(name: &str) -> String {
    match RUN_PATTERN.captures(name).and_then(|c| c.get(1)) {
        Some(n) => format!("run_{}", n.as_str()),
        None => name.to_string(),
    }
}

/// Numeric part of the run token
pub fn run_number(name: &str) -> Option<u64> {
    RUN_PATTERN
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn is_run_name(name: &str) -> bool {
    RUN_PATTERN.is_match(name)
}

/// Flow count encoded in a scenario name (`_<N>_`), 1 if absent
pub fn expected_flow_count(scenario: &str) -> usize {
    FLOW_PATTERN
        .captures(scenario)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// A scenario directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioDir {
    pub name: String,
    pub path: PathBuf,
}

/// A run directory inside a scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDir {
    /// Normalized id (`run_<N>`)
    pub id: String,
    /// Directory name as found on disk
    pub name: String,
    pub path: PathBuf,
}

/// Directory entries sorted by name
fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;

    let mut out: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .collect();
    out.sort();
    Ok(out)
}

fn dir_name(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_string_lossy().into_owned();
    }
    // "." and similar have no file name of their own
    path.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path.display().to_string())
}

/// List the scenarios under `root`.
///
/// Fails only when `root` is not a directory. If `root` itself holds run
/// directories it is returned as the only scenario.
pub fn discover_scenarios(root: &Path) -> Result<Vec<ScenarioDir>> {
    if !root.is_dir() {
        bail!("Root path does not exist: {}", root.display());
    }

    let entries = sorted_entries(root)?;
    let is_run_level = entries
        .iter()
        .any(|(name, path)| is_run_name(name) && path.is_dir());

    if is_run_level {
        return Ok(vec![ScenarioDir {
            name: dir_name(root),
            path: root.to_path_buf(),
        }]);
    }

    Ok(entries
        .into_iter()
        .filter(|(_, path)| path.is_dir())
        .map(|(name, path)| ScenarioDir { name, path })
        .collect())
}

/// List the run directories of a scenario, in ascending run number.
pub fn discover_runs(scenario_dir: &Path) -> Result<Vec<RunDir>> {
    let mut runs: Vec<RunDir> = sorted_entries(scenario_dir)?
        .into_iter()
        .filter(|(name, path)| path.is_dir() && is_run_name(name))
        .map(|(name, path)| RunDir {
            id: normalize_run_name(&name),
            name,
            path,
        })
        .collect();

    runs.sort_by(|a, b| {
        run_number(&a.name)
            .cmp(&run_number(&b.name))
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(runs)
}

/// Whether a file name is one of the captures the harness produces
pub fn is_selected_capture(name: &str, include_udp: bool) -> bool {
    let lower = name.to_lowercase();
    if !lower.ends_with(".pcap") {
        return false;
    }
    lower.starts_with("client_tcp")
        || lower == "server.pcap"
        || lower == "bottleneck.pcap"
        || (include_udp && lower.starts_with("client_udp"))
}

/// Captures of a run to analyze, sorted by name
pub fn select_captures(run_dir: &Path, include_udp: bool) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(run_dir)?
        .into_iter()
        .filter(|(name, _)| is_selected_capture(name, include_udp))
        .map(|(_, path)| path)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_run_name() {
        assert_eq!(normalize_run_name("run_3"), "run_3");
        assert_eq!(normalize_run_name("run-3"), "run_3");
        assert_eq!(normalize_run_name("run3"), "run_3");
        assert_eq!(normalize_run_name("bwNORMAL_oneflow_pfifo_run_12"), "run_12");
        assert_eq!(normalize_run_name("warmup"), "warmup");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["run_3", "run-3", "run3", "x_run-7_y", "other"] {
            let once = normalize_run_name(name);
            assert_eq!(normalize_run_name(&once), once);
        }
    }

    #[test]
    fn test_expected_flow_count() {
        assert_eq!(expected_flow_count("bw3Mbps_multiflow_10_RED_BBR"), 10);
        assert_eq!(expected_flow_count("bwNORMAL_oneflow_pfifo"), 1);
    }

    #[test]
    fn test_capture_selection() {
        assert!(is_selected_capture("client_tcp_1.pcap", false));
        assert!(is_selected_capture("Server.PCAP", false));
        assert!(is_selected_capture("bottleneck.pcap", false));
        assert!(!is_selected_capture("client_udp_1.pcap", false));
        assert!(is_selected_capture("client_udp_1.pcap", true));
        assert!(!is_selected_capture("server_eth1.pcap", true));
        assert!(!is_selected_capture("client_tcp_1.pcapng", false));
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        assert!(discover_scenarios(&dir.path().join("demo")).is_err());
    }

    #[test]
    fn test_discover_scenarios_and_runs() {
        let dir = TempDir::new().unwrap();
        let scen = dir.path().join("bw_oneflow");
        for run in ["bw_oneflow_run_10", "bw_oneflow_run_2", "run-1", "notes"] {
            fs::create_dir_all(scen.join(run)).unwrap();
        }
        fs::write(dir.path().join("all_scenarios_summary.csv"), "").unwrap();

        let scenarios = discover_scenarios(dir.path()).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].name, "bw_oneflow");

        let runs = discover_runs(&scen).unwrap();
        let ids: Vec<&str> = runs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["run_1", "run_2", "run_10"]);
    }

    #[test]
    fn test_root_with_runs_is_single_scenario() {
        let dir = TempDir::new().unwrap();
        let scen = dir.path().join("bw_multiflow_10_RED");
        fs::create_dir_all(scen.join("run_1")).unwrap();

        let scenarios = discover_scenarios(&scen).unwrap();
        assert_eq!(
            scenarios,
            vec![ScenarioDir {
                name: "bw_multiflow_10_RED".to_string(),
                path: scen.clone(),
            }]
        );
    }
}
