use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Client address of the default demo topology
pub const DEFAULT_CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 50, 10));

/// Server address of the default demo topology
pub const DEFAULT_SERVER_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 60, 20));

/// Default capture query tool, resolved through `PATH`
pub const DEFAULT_TSHARK: &str = "tshark";

/// Top-level configuration structure that mirrors the YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Address of the traffic-generating client host
    pub client_ip: IpAddr,
    /// Address of the traffic-receiving server host
    pub server_ip: IpAddr,
    /// Name or path of the capture query tool
    pub tshark: String,
    /// Also process `client_udp_*.pcap` captures
    pub include_udp: bool,
}

/// The two endpoints of the experiment topology.
///
/// Captures taken on either endpoint are filtered down to the traffic
/// between these addresses; bottleneck captures are not filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub client: IpAddr,
    pub server: IpAddr,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
    #[error("Invalid tool configuration: {0}")]
    InvalidTool(String),
}

impl AnalysisConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_ip == self.server_ip {
            return Err(ConfigError::InvalidTopology(format!(
                "client and server share the address {}",
                self.client_ip
            )));
        }

        if self.tshark.trim().is_empty() {
            return Err(ConfigError::InvalidTool(
                "capture query tool cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            client: self.client_ip,
            server: self.server_ip,
        }
    }
}

/// Default implementation for AnalysisConfig
impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            client_ip: DEFAULT_CLIENT_IP,
            server_ip: DEFAULT_SERVER_IP,
            tshark: DEFAULT_TSHARK.to_string(),
            include_udp: false,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        AnalysisConfig::default().endpoints()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.client_ip.to_string(), "192.168.50.10");
        assert_eq!(config.server_ip.to_string(), "192.168.60.20");
        assert!(!config.include_udp);
    }

    #[test]
    fn test_same_endpoints_rejected() {
        let config = AnalysisConfig {
            server_ip: DEFAULT_CLIENT_IP,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTopology(_))));
    }

    #[test]
    fn test_empty_tool_rejected() {
        let config = AnalysisConfig {
            tshark: "  ".to_string(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTool(_))));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AnalysisConfig = serde_yaml::from_str("server_ip: 10.0.0.2\n").unwrap();
        assert_eq!(config.server_ip.to_string(), "10.0.0.2");
        assert_eq!(config.client_ip, DEFAULT_CLIENT_IP);
        assert_eq!(config.tshark, "tshark");
    }
}
