//! Capture query adapter.
//!
//! Field extraction is delegated to an external capture-query engine
//! (`tshark -T fields`). The adapter only sees tab-separated text and turns
//! it into a numeric [`FieldTable`].

use std::path::{Path, PathBuf};
use std::process::Command;

/// Relative frame timestamp in seconds
pub const FRAME_TIME_RELATIVE: &str = "frame.time_relative";
/// Per-packet round-trip-time estimate in seconds
pub const ACK_RTT: &str = "tcp.analysis.ack_rtt";
/// Unacknowledged bytes in flight
pub const BYTES_IN_FLIGHT: &str = "tcp.analysis.bytes_in_flight";

/// Numeric rows extracted from a capture, one column per requested field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTable {
    fields: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FieldTable {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from already-numeric rows. Rows whose width does not
    /// match the field list, or that hold non-finite values, are dropped.
    pub fn from_rows(fields: &[&str], rows: Vec<Vec<f64>>) -> Self {
        let mut table = Self::new(fields);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    fn push_row(&mut self, row: Vec<f64>) {
        if row.len() == self.fields.len() && row.iter().all(|v| v.is_finite()) {
            self.rows.push(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Values of one column in row order, empty if the field was not requested.
    pub fn column(&self, field: &str) -> Vec<f64> {
        match self.fields.iter().position(|f| f == field) {
            Some(idx) => self.rows.iter().map(|row| row[idx]).collect(),
            None => Vec::new(),
        }
    }
}

/// Parse `-T fields` output into a numeric table.
///
/// Blank lines are ignored. A row that has the wrong number of columns or any
/// cell that does not parse as a finite number is excluded as a whole.
pub fn parse_field_output(output: &str, fields: &[&str]) -> FieldTable {
    let mut table = FieldTable::new(fields);

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let parsed: Option<Vec<f64>> = line
            .split('\t')
            .map(|cell| cell.trim().parse::<f64>().ok())
            .collect();

        if let Some(row) = parsed {
            table.push_row(row);
        }
    }

    table
}

/// Errors raised while running the capture query tool
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ExitStatus {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Field-extraction interface over a capture file.
///
/// Implementations never fail: a query that cannot be answered yields an
/// empty table, which callers treat as "no qualifying packets".
pub trait CaptureQuery {
    fn query(&self, capture: &Path, fields: &[&str], filter: &str) -> FieldTable;
}

/// [`CaptureQuery`] backed by the `tshark` command-line tool.
#[derive(Debug, Clone)]
pub struct TsharkQuery {
    binary: PathBuf,
}

impl TsharkQuery {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// Argument list for one extraction query
    pub fn build_args(capture: &Path, fields: &[&str], filter: &str) -> Vec<String> {
        let mut args = vec![
            "-r".to_string(),
            capture.display().to_string(),
            "-Y".to_string(),
            filter.to_string(),
            "-Tfields".to_string(),
        ];
        for field in fields {
            args.push("-e".to_string());
            args.push(field.to_string());
        }
        args.push("-E".to_string());
        args.push("separator=\t".to_string());
        args
    }

    /// Run the tool and return its raw standard output.
    pub fn run(&self, capture: &Path, fields: &[&str], filter: &str) -> Result<String, QueryError> {
        let tool = self.binary.display().to_string();
        let output = Command::new(&self.binary)
            .args(Self::build_args(capture, fields, filter))
            .output()
            .map_err(|source| QueryError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(QueryError::ExitStatus {
                tool,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl CaptureQuery for TsharkQuery {
    fn query(&self, capture: &Path, fields: &[&str], filter: &str) -> FieldTable {
        match self.run(capture, fields, filter) {
            Ok(stdout) => parse_field_output(&stdout, fields),
            Err(e) => {
                log::debug!("Query on {} failed: {}", capture.display(), e);
                FieldTable::new(fields)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_blank_and_non_numeric_rows() {
        let output = "0.000000\n\n0.100000\nabc\n0.250000\n";
        let table = parse_field_output(output, &[FRAME_TIME_RELATIVE]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.column(FRAME_TIME_RELATIVE), vec![0.0, 0.1, 0.25]);
    }

    #[test]
    fn test_parse_excludes_partial_rows() {
        // The second row has no RTT sample and must not be zero-filled
        let output = "0.010\t1448\n\t2896\n0.030\t4344\n0.020\tNaN\n";
        let table = parse_field_output(output, &[ACK_RTT, BYTES_IN_FLIGHT]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column(ACK_RTT), vec![0.010, 0.030]);
        assert_eq!(table.column(BYTES_IN_FLIGHT), vec![1448.0, 4344.0]);
    }

    #[test]
    fn test_parse_rejects_multi_value_cells() {
        let output = "0.1,0.2\n0.3\n";
        let table = parse_field_output(output, &[ACK_RTT]);
        assert_eq!(table.column(ACK_RTT), vec![0.3]);
    }

    #[test]
    fn test_unknown_column_is_empty() {
        let table = FieldTable::from_rows(&[ACK_RTT], vec![vec![1.0]]);
        assert!(table.column(BYTES_IN_FLIGHT).is_empty());
    }

    #[test]
    fn test_build_args() {
        let args = TsharkQuery::build_args(
            Path::new("run_1/server.pcap"),
            &[FRAME_TIME_RELATIVE],
            "tcp",
        );
        assert_eq!(
            args,
            vec!["-r", "run_1/server.pcap", "-Y", "tcp", "-Tfields", "-e", "frame.time_relative", "-E", "separator=\t"]
        );
    }

    #[test]
    fn test_missing_tool_yields_empty_table() {
        let query = TsharkQuery::new("/nonexistent/tshark");
        let table = query.query(Path::new("capture.pcap"), &[FRAME_TIME_RELATIVE], "tcp");
        assert!(table.is_empty());
        assert_eq!(table.fields(), &["frame.time_relative".to_string()]);
    }

    /// Install an executable shell script standing in for the query tool
    #[cfg(unix)]
    fn fake_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("tshark");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_yields_empty_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = fake_tool(dir.path(), "printf '0.0\\n0.1\\n'\nexit 2");
        let query = TsharkQuery::new(tool);

        let err = query
            .run(Path::new("capture.pcap"), &[FRAME_TIME_RELATIVE], "tcp")
            .unwrap_err();
        assert!(matches!(err, QueryError::ExitStatus { .. }));

        let table = query.query(Path::new("capture.pcap"), &[FRAME_TIME_RELATIVE], "tcp");
        assert!(table.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_run_is_parsed() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = fake_tool(dir.path(), "printf '0.0\\n0.1\\n'");
        let query = TsharkQuery::new(tool);

        let table = query.query(Path::new("capture.pcap"), &[FRAME_TIME_RELATIVE], "tcp");
        assert_eq!(table.column(FRAME_TIME_RELATIVE), vec![0.0, 0.1]);
    }
}
