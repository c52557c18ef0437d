//! Batch orchestration.
//!
//! Walks the experiment tree strictly sequentially (scenarios, then runs,
//! then captures) and writes the per-scenario and global tables. A failure
//! inside one capture, run or scenario is logged and the batch continues;
//! only a missing root directory aborts.

use std::path::Path;

use color_eyre::eyre::Result;

use crate::analysis::report::{
    write_all_scenarios_summary, write_capture_averages, write_capture_records,
    write_scenario_summary, ALL_SCENARIOS_PCAP_FILE, ALL_SCENARIOS_SUMMARY_FILE,
    PCAP_SUMMARY_FILE, SUMMARY_FILE,
};
use crate::analysis::{
    average_captures_by_run, average_runs_by_scenario, global_capture_average,
    parse_socket_stats_file, summarize_run, summarize_scenario_runs, CaptureAverage,
    CaptureRecord, ScenarioSummary,
};
use crate::capture::{summarize_capture, CaptureQuery};
use crate::config::AnalysisConfig;
use crate::layout::{
    discover_runs, discover_scenarios, expected_flow_count, select_captures, ScenarioDir,
    SS_LOG_FILE,
};

/// Which passes to run
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    /// Capture pass: `pcap_summary.csv` and `all_scenarios_pcap.csv`
    pub captures: bool,
    /// Throughput pass: `summary.csv` and `all_scenarios_summary.csv`
    pub throughput: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            captures: true,
            throughput: true,
        }
    }
}

/// Everything produced by one invocation
#[derive(Debug, Default)]
pub struct AnalysisOutcome {
    pub capture_records: Vec<CaptureRecord>,
    /// Per-scenario capture averages (second aggregation stage)
    pub capture_scenarios: Vec<CaptureAverage>,
    pub capture_global: Option<CaptureAverage>,
    pub scenario_summaries: Vec<ScenarioSummary>,
}

fn log_write_failure(result: Result<()>) {
    if let Err(e) = result {
        log::warn!("{:#}", e);
    }
}

/// Capture records of every run of one scenario
pub fn summarize_scenario_captures<Q: CaptureQuery + ?Sized>(
    scenario: &ScenarioDir,
    config: &AnalysisConfig,
    query: &Q,
) -> Vec<CaptureRecord> {
    let runs = match discover_runs(&scenario.path) {
        Ok(runs) => runs,
        Err(e) => {
            log::warn!("Skipping scenario {}: {:#}", scenario.name, e);
            return Vec::new();
        }
    };

    let endpoints = config.endpoints();
    let mut records = Vec::new();

    for run in runs {
        let socket = parse_socket_stats_file(&run.path.join(SS_LOG_FILE));

        let captures = match select_captures(&run.path, config.include_udp) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Skipping run {}: {:#}", run.path.display(), e);
                continue;
            }
        };

        for capture in captures {
            if let Some(summary) = summarize_capture(query, &capture, &endpoints) {
                log::debug!("{}/{}: {:?}", run.id, summary.pcap, summary.metrics);
                records.push(CaptureRecord::new(summary, &scenario.name, &run.id, socket));
            }
        }
    }

    records
}

/// Capture pass over all scenarios.
///
/// Writes `pcap_summary.csv` for every scenario with at least one capture and
/// `all_scenarios_pcap.csv` at the root with the two-stage averages.
pub fn summarize_captures<Q: CaptureQuery + ?Sized>(
    root: &Path,
    scenarios: &[ScenarioDir],
    config: &AnalysisConfig,
    query: &Q,
    outcome: &mut AnalysisOutcome,
) {
    for scenario in scenarios {
        log::info!("Capture pass: scenario {}", scenario.name);
        let records = summarize_scenario_captures(scenario, config, query);
        if records.is_empty() {
            log::info!("No captures summarized for {}", scenario.name);
            continue;
        }

        log_write_failure(write_capture_records(
            &scenario.path.join(PCAP_SUMMARY_FILE),
            &records,
        ));
        outcome.capture_records.extend(records);
    }

    if outcome.capture_records.is_empty() {
        log::warn!("No captures summarized under {}", root.display());
        return;
    }

    let per_run = average_captures_by_run(&outcome.capture_records);
    let per_scenario = average_runs_by_scenario(&per_run);
    let global = global_capture_average(&per_scenario);

    log_write_failure(write_capture_averages(
        &root.join(ALL_SCENARIOS_PCAP_FILE),
        &per_scenario,
        global.as_ref(),
    ));

    outcome.capture_scenarios = per_scenario;
    outcome.capture_global = global;
}

/// Run summaries of one scenario, `None` when it has no runs
pub fn summarize_scenario(scenario: &ScenarioDir) -> Option<ScenarioSummary> {
    let runs = match discover_runs(&scenario.path) {
        Ok(runs) => runs,
        Err(e) => {
            log::warn!("Skipping scenario {}: {:#}", scenario.name, e);
            return None;
        }
    };

    let flows = expected_flow_count(&scenario.name);
    let summaries = runs
        .iter()
        .map(|run| {
            log::info!("Processing {}", run.path.display());
            summarize_run(&run.path, &run.id, flows)
        })
        .collect();

    let summary = summarize_scenario_runs(&scenario.name, summaries);
    if summary.is_none() {
        log::warn!("No runs found in {}", scenario.path.display());
    }
    summary
}

/// Throughput pass over all scenarios.
///
/// Writes `summary.csv` per scenario and `all_scenarios_summary.csv` at the
/// root, one row per scenario.
pub fn summarize_throughput(root: &Path, scenarios: &[ScenarioDir], outcome: &mut AnalysisOutcome) {
    for scenario in scenarios {
        log::info!("Throughput pass: scenario {}", scenario.name);
        if let Some(summary) = summarize_scenario(scenario) {
            log_write_failure(write_scenario_summary(&scenario.path.join(SUMMARY_FILE), &summary));
            outcome.scenario_summaries.push(summary);
        }
    }

    if outcome.scenario_summaries.is_empty() {
        log::warn!("No scenarios summarized under {}", root.display());
        return;
    }

    log_write_failure(write_all_scenarios_summary(
        &root.join(ALL_SCENARIOS_SUMMARY_FILE),
        &outcome.scenario_summaries,
    ));
}

/// Run the requested passes over an experiment tree.
pub fn run_analysis<Q: CaptureQuery + ?Sized>(
    root: &Path,
    config: &AnalysisConfig,
    query: &Q,
    options: AnalysisOptions,
) -> Result<AnalysisOutcome> {
    let scenarios = discover_scenarios(root)?;
    log::info!("Found {} scenario(s) under {}", scenarios.len(), root.display());

    let mut outcome = AnalysisOutcome::default();

    if options.captures {
        summarize_captures(root, &scenarios, config, query, &mut outcome);
    }

    if options.throughput {
        summarize_throughput(root, &scenarios, &mut outcome);
    }

    Ok(outcome)
}
