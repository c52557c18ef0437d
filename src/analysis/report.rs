//! CSV report generation.
//!
//! Tables are rendered with the column lists declared in [`super::types`],
//! never from struct or map field order. Files are overwritten on each run.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use super::types::*;

/// Per-scenario capture table
pub const PCAP_SUMMARY_FILE: &str = "pcap_summary.csv";
/// Global capture table, one row per scenario
pub const ALL_SCENARIOS_PCAP_FILE: &str = "all_scenarios_pcap.csv";
/// Per-scenario run table
pub const SUMMARY_FILE: &str = "summary.csv";
/// Global run table, one row per scenario
pub const ALL_SCENARIOS_SUMMARY_FILE: &str = "all_scenarios_summary.csv";

/// Errors raised when reading a table back
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Table is empty")]
    Empty,

    #[error("Unexpected header: expected {expected:?}, found {found:?}")]
    SchemaMismatch { expected: Vec<String>, found: Vec<String> },

    #[error("Line {line}: invalid value {value:?} in column {column}")]
    BadValue { line: usize, column: String, value: String },

    #[error("Line {line}: expected {expected} cells, found {found}")]
    RowWidth { line: usize, expected: usize, found: usize },
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Split one CSV line, honoring double-quoted cells
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

fn fmt_f64(v: f64) -> String {
    v.to_string()
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_f64).unwrap_or_default()
}

fn header(leading: &[&str], metrics: &[&str]) -> String {
    leading
        .iter()
        .chain(metrics.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(",")
}

/// Render `pcap_summary.csv`
pub fn render_capture_records(records: &[CaptureRecord]) -> String {
    let mut lines = vec![header(&["pcap", "run"], &CAPTURE_METRIC_COLUMNS)];
    for record in records {
        let mut row = vec![escape_csv(&record.pcap), escape_csv(&record.run)];
        row.extend(record.metric_values().iter().map(|v| fmt_f64(*v)));
        lines.push(row.join(","));
    }
    lines.join("\n") + "\n"
}

/// Render `all_scenarios_pcap.csv`: scenario rows plus an optional global row
pub fn render_capture_averages(scenarios: &[CaptureAverage], global: Option<&CaptureAverage>) -> String {
    let mut columns: Vec<&str> = CAPTURE_METRIC_COLUMNS.to_vec();
    columns.push("n_pcaps");
    let mut lines = vec![header(&["scenario"], &columns)];

    for avg in scenarios.iter().chain(global) {
        let mut row = vec![escape_csv(&avg.scenario)];
        row.extend(avg.values.iter().map(|v| fmt_f64(*v)));
        row.push(avg.n_pcaps.to_string());
        lines.push(row.join(","));
    }
    lines.join("\n") + "\n"
}

fn run_row(label: &str, summary: &RunSummary) -> String {
    let mut row = vec![escape_csv(label)];
    row.extend(summary.values().iter().map(|v| fmt_opt(*v)));
    row.join(",")
}

/// Render `summary.csv`: one row per run followed by the `avg` row
pub fn render_scenario_summary(summary: &ScenarioSummary) -> String {
    let mut lines = vec![header(&["run_id"], &RUN_METRIC_COLUMNS)];
    for run in summary.runs.iter().chain(std::iter::once(&summary.average)) {
        lines.push(run_row(&run.run_id, run));
    }
    lines.join("\n") + "\n"
}

/// Render `all_scenarios_summary.csv`, indexed by scenario name
pub fn render_all_scenarios_summary(scenarios: &[ScenarioSummary]) -> String {
    let mut lines = vec![header(&["scenario"], &RUN_METRIC_COLUMNS)];
    for scenario in scenarios {
        lines.push(run_row(&scenario.scenario, &scenario.average));
    }
    lines.join("\n") + "\n"
}

fn write_table(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .with_context(|| format!("Failed to write table to {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

pub fn write_capture_records(path: &Path, records: &[CaptureRecord]) -> Result<()> {
    write_table(path, &render_capture_records(records))
}

pub fn write_capture_averages(
    path: &Path,
    scenarios: &[CaptureAverage],
    global: Option<&CaptureAverage>,
) -> Result<()> {
    write_table(path, &render_capture_averages(scenarios, global))
}

pub fn write_scenario_summary(path: &Path, summary: &ScenarioSummary) -> Result<()> {
    write_table(path, &render_scenario_summary(summary))
}

pub fn write_all_scenarios_summary(path: &Path, scenarios: &[ScenarioSummary]) -> Result<()> {
    write_table(path, &render_all_scenarios_summary(scenarios))
}

/// Parse a run table (`summary.csv` layout), including its `avg` row.
pub fn parse_run_summary_csv(content: &str) -> std::result::Result<Vec<RunSummary>, ReportError> {
    let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (_, header_line) = lines.next().ok_or(ReportError::Empty)?;
    let found = split_csv_line(header_line);
    let expected: Vec<String> = std::iter::once("run_id")
        .chain(RUN_METRIC_COLUMNS.iter().copied())
        .map(str::to_string)
        .collect();
    if found != expected {
        return Err(ReportError::SchemaMismatch { expected, found });
    }

    let mut runs = Vec::new();
    for (idx, line) in lines {
        let cells = split_csv_line(line);
        if cells.len() != expected.len() {
            return Err(ReportError::RowWidth {
                line: idx + 1,
                expected: expected.len(),
                found: cells.len(),
            });
        }

        let mut values = [None; 9];
        for (col, cell) in cells[1..].iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let value = cell.parse::<f64>().map_err(|_| ReportError::BadValue {
                line: idx + 1,
                column: RUN_METRIC_COLUMNS[col].to_string(),
                value: cell.clone(),
            })?;
            values[col] = Some(value);
        }
        runs.push(RunSummary::from_values(cells[0].clone(), values));
    }

    Ok(runs)
}

/// Read a run table back from disk
pub fn read_run_summary_csv(path: &Path) -> Result<Vec<RunSummary>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read table from {}", path.display()))?;
    let runs = parse_run_summary_csv(&content)
        .with_context(|| format!("Malformed table {}", path.display()))?;
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureMetrics, CaptureRole};

    #[test]
    fn test_escape_and_split() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");

        let line = format!("{},{},x", escape_csv("a,b"), escape_csv("q\"q"));
        assert_eq!(split_csv_line(&line), vec!["a,b", "q\"q", "x"]);
        assert_eq!(split_csv_line("a,,"), vec!["a", "", ""]);
    }

    #[test]
    fn test_capture_record_columns() {
        let record = CaptureRecord {
            pcap: "client_tcp_1.pcap".to_string(),
            role: CaptureRole::Client,
            scenario: "bw_oneflow".to_string(),
            run: "run_1".to_string(),
            metrics: CaptureMetrics {
                gap_avg_ms: 2.5,
                ack_interval_avg_ms: 125.0,
                ..CaptureMetrics::default()
            },
            socket: SocketStats {
                avg_rtt_ms: 10.0,
                avg_cwnd_kb: 0.5,
            },
        };
        let csv = render_capture_records(&[record]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "pcap,run,rtt_avg_ms,rtt_std_ms,cwnd_avg_kB,gap_avg_ms,ack_interval_avg_ms,ss_avg_rtt_ms,ss_avg_cwnd"
        );
        assert_eq!(lines.next().unwrap(), "client_tcp_1.pcap,run_1,0,0,0,2.5,125,10,0.5");
    }

    #[test]
    fn test_capture_average_columns() {
        let scenario = CaptureAverage {
            scenario: "s1".to_string(),
            values: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            n_pcaps: 3,
        };
        let global = CaptureAverage {
            scenario: "avg".to_string(),
            ..scenario.clone()
        };
        let csv = render_capture_averages(&[scenario], Some(&global));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "scenario,rtt_avg_ms,rtt_std_ms,cwnd_avg_kB,gap_avg_ms,ack_interval_avg_ms,ss_avg_rtt_ms,ss_avg_cwnd,n_pcaps"
        );
        assert_eq!(lines[1], "s1,1,2,3,4,5,6,7,3");
        assert_eq!(lines[2], "avg,1,2,3,4,5,6,7,3");
    }

    #[test]
    fn test_absent_values_are_empty_cells() {
        let mut run = RunSummary::new("run_1");
        run.bottleneck_bw = Some(12.5);
        let summary = ScenarioSummary {
            scenario: "s".to_string(),
            runs: vec![run.clone()],
            average: RunSummary {
                run_id: "avg".to_string(),
                ..run
            },
        };
        let csv = render_scenario_summary(&summary);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "run_1,,,,,,,,12.5,");
        assert_eq!(lines[2], "avg,,,,,,,,12.5,");
    }

    #[test]
    fn test_parse_rejects_foreign_header() {
        let err = parse_run_summary_csv("run_id,bandwidth\nrun_1,3\n").unwrap_err();
        assert!(matches!(err, ReportError::SchemaMismatch { .. }));
        assert!(matches!(parse_run_summary_csv(""), Err(ReportError::Empty)));
    }

    #[test]
    fn test_parse_rejects_bad_cells() {
        let mut csv = render_scenario_summary(&ScenarioSummary {
            scenario: "s".to_string(),
            runs: vec![],
            average: RunSummary::new("avg"),
        });
        csv.push_str("run_1,fast,,,,,,,,\n");
        let err = parse_run_summary_csv(&csv).unwrap_err();
        assert!(matches!(err, ReportError::BadValue { .. }));
    }
}
