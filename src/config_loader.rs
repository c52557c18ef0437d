use crate::config::AnalysisConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::net::IpAddr;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<AnalysisConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: AnalysisConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// CLI arguments that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub client_ip: Option<IpAddr>,
    pub server_ip: Option<IpAddr>,
    pub tshark: Option<String>,
    pub include_udp: bool,
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut AnalysisConfig, overrides: &CliOverrides) -> Result<()> {
    if let Some(ip) = overrides.client_ip {
        info!("Client address override: {}", ip);
        config.client_ip = ip;
    }

    if let Some(ip) = overrides.server_ip {
        info!("Server address override: {}", ip);
        config.server_ip = ip;
    }

    if let Some(tool) = &overrides.tshark {
        config.tshark = tool.clone();
    }

    // The flag can only opt in
    if overrides.include_udp {
        config.include_udp = true;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}

/// Build the effective configuration from an optional file plus CLI overrides
pub fn resolve_config(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<AnalysisConfig> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    apply_overrides(&mut config, overrides)?;
    Ok(config)
}
