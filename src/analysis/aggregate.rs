//! Hierarchical aggregation of capture records and run summaries.
//!
//! Averaging is always two-stage: captures are folded into one row per run,
//! then runs into one row per scenario, so every run weighs the same in a
//! scenario regardless of how many captures it produced.

use std::collections::BTreeMap;
use std::path::Path;

use super::ifstat::{find_ifstat_log, parse_ifstat_file, LINK_ROLES};
use super::iperf::{load_iperf_result, ThroughputResult};
use super::types::*;
use crate::utils::stats::{jain_fairness, mean, mean_present};

/// Column-wise mean of fixed-width metric rows
fn column_means(rows: &[[f64; 7]]) -> [f64; 7] {
    let mut out = [0.0; 7];
    for (idx, slot) in out.iter_mut().enumerate() {
        let column: Vec<f64> = rows.iter().map(|r| r[idx]).collect();
        *slot = mean(&column);
    }
    out
}

/// First stage: one row per (scenario, run), sorted by scenario then run.
pub fn average_captures_by_run(records: &[CaptureRecord]) -> Vec<CaptureAverage> {
    let mut groups: BTreeMap<(&str, &str), Vec<[f64; 7]>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.scenario.as_str(), record.run.as_str()))
            .or_default()
            .push(record.metric_values());
    }

    groups
        .into_iter()
        .map(|((scenario, _run), rows)| CaptureAverage {
            scenario: scenario.to_string(),
            values: column_means(&rows),
            n_pcaps: rows.len(),
        })
        .collect()
}

/// Second stage: one row per scenario, each run weighted equally.
///
/// `n_pcaps` is the total number of captures of the scenario.
pub fn average_runs_by_scenario(runs: &[CaptureAverage]) -> Vec<CaptureAverage> {
    let mut groups: BTreeMap<&str, Vec<&CaptureAverage>> = BTreeMap::new();
    for run in runs {
        groups.entry(run.scenario.as_str()).or_default().push(run);
    }

    groups
        .into_iter()
        .map(|(scenario, members)| {
            let rows: Vec<[f64; 7]> = members.iter().map(|m| m.values).collect();
            CaptureAverage {
                scenario: scenario.to_string(),
                values: column_means(&rows),
                n_pcaps: members.iter().map(|m| m.n_pcaps).sum(),
            }
        })
        .collect()
}

/// Global row: mean of scenario rows, labelled `avg`.
pub fn global_capture_average(scenarios: &[CaptureAverage]) -> Option<CaptureAverage> {
    if scenarios.is_empty() {
        return None;
    }
    let rows: Vec<[f64; 7]> = scenarios.iter().map(|s| s.values).collect();
    Some(CaptureAverage {
        scenario: "avg".to_string(),
        values: column_means(&rows),
        n_pcaps: scenarios.iter().map(|s| s.n_pcaps).sum(),
    })
}

/// Fold parsed test results into a run summary.
///
/// Only a TCP result counts for the TCP columns and only a UDP result for the
/// UDP columns; results without flows leave the columns absent.
pub fn apply_throughput(summary: &mut RunSummary, tcp: Option<&ThroughputResult>, udp: Option<&ThroughputResult>) {
    if let Some(ThroughputResult::Tcp(result)) = tcp {
        if !result.per_flow_mbps.is_empty() {
            summary.tcp_avg_bw_mbps = Some(mean(&result.per_flow_mbps));
            summary.tcp_fairness = Some(jain_fairness(&result.per_flow_mbps));
            summary.tcp_avg_retrans = Some(result.avg_retransmits);
        }
    }

    if let Some(ThroughputResult::Udp(result)) = udp {
        if !result.per_flow_mbps.is_empty() {
            summary.udp_avg_bw_mbps = Some(mean(&result.per_flow_mbps));
            summary.udp_avg_lost_pct = Some(result.avg_lost_pct);
            summary.udp_avg_jitter_ms = Some(result.avg_jitter_ms);
        }
    }
}

/// Build the summary of one run directory.
///
/// Reads `tcp.json`, `udp.json` and the per-role `ifstat_<role>_*.log`
/// files; whatever is missing simply leaves its columns absent.
pub fn summarize_run(run_dir: &Path, run_id: &str, expected_flows: usize) -> RunSummary {
    let mut summary = RunSummary::new(run_id);

    let mut results = Vec::with_capacity(2);
    for name in ["tcp.json", "udp.json"] {
        let path = run_dir.join(name);
        if path.exists() {
            results.push(load_iperf_result(&path));
        } else {
            log::warn!("Missing {} in {}", name, run_dir.display());
            results.push(None);
        }
    }
    apply_throughput(&mut summary, results[0].as_ref(), results[1].as_ref());

    if let Some(ThroughputResult::Tcp(tcp)) = &results[0] {
        if !tcp.per_flow_mbps.is_empty() && tcp.per_flow_mbps.len() != expected_flows {
            log::debug!(
                "{}: expected {} TCP flows, result reports {}",
                run_id,
                expected_flows,
                tcp.per_flow_mbps.len()
            );
        }
    }

    for role in LINK_ROLES {
        if let Some(path) = find_ifstat_log(run_dir, role) {
            let rates = parse_ifstat_file(&path);
            summary.set_link_bw(role, rates.tx_mbps());
        }
    }

    summary
}

/// Column-wise mean of run summaries over present values, labelled `avg`
pub fn average_run_summaries(runs: &[RunSummary]) -> RunSummary {
    let mut values = [None; 9];
    for (idx, slot) in values.iter_mut().enumerate() {
        *slot = mean_present(runs.iter().map(|r| r.values()[idx]));
    }
    RunSummary::from_values("avg", values)
}

/// Fold summaries sharing a run id into one row, in first-seen order.
///
/// Directories such as `run_1` and `run-1` normalize to the same id and count
/// as a single run; their values are averaged over what each one reported.
pub fn merge_duplicate_runs(runs: Vec<RunSummary>) -> Vec<RunSummary> {
    let mut groups: Vec<(String, Vec<RunSummary>)> = Vec::new();
    for run in runs {
        match groups.iter_mut().find(|(id, _)| *id == run.run_id) {
            Some((_, group)) => group.push(run),
            None => groups.push((run.run_id.clone(), vec![run])),
        }
    }

    groups
        .into_iter()
        .map(|(id, mut group)| {
            if group.len() == 1 {
                if let Some(run) = group.pop() {
                    return run;
                }
            }
            log::debug!("Merging {} directories reporting {}", group.len(), id);
            RunSummary {
                run_id: id,
                ..average_run_summaries(&group)
            }
        })
        .collect()
}

/// Attach the average row to the runs of a scenario, `None` without runs
pub fn summarize_scenario_runs(scenario: &str, runs: Vec<RunSummary>) -> Option<ScenarioSummary> {
    if runs.is_empty() {
        return None;
    }
    let runs = merge_duplicate_runs(runs);
    let average = average_run_summaries(&runs);
    Some(ScenarioSummary {
        scenario: scenario.to_string(),
        runs,
        average,
    })
}
