use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::net::IpAddr;
use std::path::PathBuf;

use netsummary::capture::TsharkQuery;
use netsummary::config_loader::{resolve_config, CliOverrides};
use netsummary::orchestrator::{run_analysis, AnalysisOptions};
use netsummary::utils::validate_tool_spec;

/// Summarize captures and throughput results of network experiments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root experiments folder, or a single scenario folder holding run folders
    #[arg(default_value = "demo")]
    root: PathBuf,

    /// Also process client_udp_*.pcap captures
    #[arg(long)]
    include_udp: bool,

    /// Optional YAML configuration (topology addresses, tool path)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Client address used in endpoint capture filters
    #[arg(long)]
    client_ip: Option<IpAddr>,

    /// Server address used in endpoint capture filters
    #[arg(long)]
    server_ip: Option<IpAddr>,

    /// Name or path of the tshark binary
    #[arg(long)]
    tshark: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Skip the capture pass (pcap_summary.csv, all_scenarios_pcap.csv)
    #[arg(long)]
    skip_captures: bool,

    /// Skip the throughput pass (summary.csv, all_scenarios_summary.csv)
    #[arg(long)]
    skip_throughput: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            client_ip: self.client_ip,
            server_ip: self.server_ip,
            tshark: self.tshark.clone(),
            include_udp: self.include_udp,
        }
    }

    fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            captures: !self.skip_captures,
            throughput: !self.skip_throughput,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    let config = resolve_config(args.config.as_deref(), &args.overrides())?;
    info!(
        "Scanning experiments under: {} (include_udp={})",
        args.root.display(),
        config.include_udp
    );

    let options = args.options();
    let query = if options.captures {
        match validate_tool_spec(&config.tshark) {
            Ok(path) => {
                info!("Using capture query tool {}", path.display());
                TsharkQuery::new(path)
            }
            Err(e) => {
                warn!("{}; capture metrics will be zero", e);
                TsharkQuery::new(&config.tshark)
            }
        }
    } else {
        TsharkQuery::new(&config.tshark)
    };

    let outcome = run_analysis(&args.root, &config, &query, options)?;

    info!(
        "Done: {} capture(s) in {} scenario(s), {} scenario run summaries",
        outcome.capture_records.len(),
        outcome.capture_scenarios.len(),
        outcome.scenario_summaries.len()
    );
    Ok(())
}
