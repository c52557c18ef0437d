//! Capture role classification.
//!
//! A capture's vantage point is inferred from its file name and decides both
//! the display filter and the metric set computed for it.

use std::fmt;
use std::net::IpAddr;

use crate::config::Endpoints;

/// Vantage point a capture was recorded at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureRole {
    /// Sending host
    Client,
    /// Receiving host
    Server,
    /// Router in the middle of the path, sees both directions
    Bottleneck,
}

impl CaptureRole {
    /// Classify a capture by name (case-insensitive substring match).
    ///
    /// "client" wins over "server"; every other name is a bottleneck capture.
    pub fn from_capture_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("client") {
            CaptureRole::Client
        } else if lower.contains("server") {
            CaptureRole::Server
        } else {
            CaptureRole::Bottleneck
        }
    }

    /// Display filter selecting the TCP traffic relevant to this vantage point
    pub fn display_filter(&self, endpoints: &Endpoints) -> String {
        match self {
            CaptureRole::Client => endpoint_filter(endpoints.client, endpoints.server),
            CaptureRole::Server => endpoint_filter(endpoints.server, endpoints.client),
            CaptureRole::Bottleneck => "tcp".to_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureRole::Client => "client",
            CaptureRole::Server => "server",
            CaptureRole::Bottleneck => "bottleneck",
        }
    }
}

/// Dissector field prefix holding an address of this family
fn address_field(addr: IpAddr) -> &'static str {
    match addr {
        IpAddr::V4(_) => "ip",
        IpAddr::V6(_) => "ipv6",
    }
}

/// TCP traffic sent by `local` or addressed to `peer`
fn endpoint_filter(local: IpAddr, peer: IpAddr) -> String {
    format!(
        "tcp and ({}.src=={} or {}.dst=={})",
        address_field(local),
        local,
        address_field(peer),
        peer
    )
}

impl fmt::Display for CaptureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role plus the filter derived for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub role: CaptureRole,
    pub filter: String,
}

impl Classification {
    /// Filter restricted to ACK-flagged packets
    pub fn ack_filter(&self) -> String {
        format!("{} and tcp.flags.ack==1", self.filter)
    }
}

/// Classify a capture name against the configured endpoints
pub fn classify(name: &str, endpoints: &Endpoints) -> Classification {
    let role = CaptureRole::from_capture_name(name);
    Classification {
        role,
        filter: role.display_filter(endpoints),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_name() {
        assert_eq!(CaptureRole::from_capture_name("client_tcp_1.pcap"), CaptureRole::Client);
        assert_eq!(CaptureRole::from_capture_name("SERVER.pcap"), CaptureRole::Server);
        assert_eq!(CaptureRole::from_capture_name("bottleneck.pcap"), CaptureRole::Bottleneck);
        assert_eq!(CaptureRole::from_capture_name("router_eth1.pcap"), CaptureRole::Bottleneck);
        assert_eq!(CaptureRole::from_capture_name(""), CaptureRole::Bottleneck);
    }

    #[test]
    fn test_client_takes_priority() {
        assert_eq!(CaptureRole::from_capture_name("server_to_Client.pcap"), CaptureRole::Client);
    }

    #[test]
    fn test_endpoint_filters() {
        let endpoints = Endpoints {
            client: "10.0.0.1".parse().unwrap(),
            server: "10.0.0.2".parse().unwrap(),
        };

        let client = classify("client_tcp_1.pcap", &endpoints);
        assert_eq!(client.filter, "tcp and (ip.src==10.0.0.1 or ip.dst==10.0.0.2)");
        assert_eq!(
            client.ack_filter(),
            "tcp and (ip.src==10.0.0.1 or ip.dst==10.0.0.2) and tcp.flags.ack==1"
        );

        let server = classify("server.pcap", &endpoints);
        assert_eq!(server.filter, "tcp and (ip.src==10.0.0.2 or ip.dst==10.0.0.1)");

        let bottleneck = classify("bottleneck.pcap", &endpoints);
        assert_eq!(bottleneck.role, CaptureRole::Bottleneck);
        assert_eq!(bottleneck.filter, "tcp");
    }

    #[test]
    fn test_ipv6_endpoints_use_ipv6_fields() {
        let endpoints = Endpoints {
            client: "fd00::10".parse().unwrap(),
            server: "fd00::20".parse().unwrap(),
        };

        let client = classify("client_tcp_1.pcap", &endpoints);
        assert_eq!(client.filter, "tcp and (ipv6.src==fd00::10 or ipv6.dst==fd00::20)");

        let server = classify("server.pcap", &endpoints);
        assert_eq!(server.filter, "tcp and (ipv6.src==fd00::20 or ipv6.dst==fd00::10)");
        assert!(!server.ack_filter().contains("ip.src"));
    }

    #[test]
    fn test_mixed_family_endpoints() {
        let endpoints = Endpoints {
            client: "10.0.0.1".parse().unwrap(),
            server: "fd00::20".parse().unwrap(),
        };
        let client = classify("client_tcp_1.pcap", &endpoints);
        assert_eq!(client.filter, "tcp and (ip.src==10.0.0.1 or ipv6.dst==fd00::20)");
    }
}
