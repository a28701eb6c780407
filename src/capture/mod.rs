//! Capture socket acquisition.
//!
//! This module defines the `FrameSource` trait and the `RawCapture`
//! implementation backed by an `AF_PACKET` socket. The trait lets the
//! read loop be driven by scripted sources in tests instead of a live
//! socket.

#[cfg(target_os = "linux")]
mod raw_socket;

#[cfg(target_os = "linux")]
pub use raw_socket::{RawCapture, MAX_INTERFACE_NAME_LEN};

use std::io;

/// Configuration for acquiring a capture socket. Consumed once by
/// `RawCapture::open`.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Name of the interface to capture on (e.g., eth0)
    pub interface: String,
    /// Whether to enable promiscuous mode on the interface
    pub promiscuous: bool,
    /// Whether to capture only IPv4 frames (ETH_P_IP instead of ETH_P_ALL)
    pub ip_only: bool,
}

impl CaptureConfig {
    /// Create a configuration with both capture options disabled.
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            promiscuous: false,
            ip_only: false,
        }
    }

    /// Enable or disable promiscuous mode.
    pub fn with_promiscuous(mut self, promiscuous: bool) -> Self {
        self.promiscuous = promiscuous;
        self
    }

    /// Enable or disable the IPv4-only protocol filter.
    pub fn with_ip_only(mut self, ip_only: bool) -> Self {
        self.ip_only = ip_only;
        self
    }
}

/// A blocking source of link-layer frames.
///
/// One call reads at most one frame into `buf` and returns its length.
/// Implemented by `RawCapture` for live capture and by scripted sources
/// in the listener tests.
pub trait FrameSource {
    /// Block until a frame arrives, copy it into `buf`, and return the
    /// number of bytes read.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// List all available network interfaces with status and addresses.
pub fn list_interfaces() -> Vec<String> {
    pnet::datalink::interfaces()
        .into_iter()
        .map(|iface| {
            let status = if iface.is_up() { "UP" } else { "DOWN" };
            let ips: Vec<_> = iface.ips.iter().map(|ip| ip.to_string()).collect();
            format!(
                "{}: {} [{}]",
                iface.name,
                status,
                if ips.is_empty() {
                    "no IP".to_string()
                } else {
                    ips.join(", ")
                }
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod config_tests {
        use super::*;

        #[test]
        fn defaults_are_off() {
            let config = CaptureConfig::new("eth0");
            assert_eq!(config.interface, "eth0");
            assert!(!config.promiscuous);
            assert!(!config.ip_only);
        }

        #[test]
        fn builders_set_flags() {
            let config = CaptureConfig::new("eth0")
                .with_promiscuous(true)
                .with_ip_only(true);
            assert!(config.promiscuous);
            assert!(config.ip_only);
        }
    }
}
