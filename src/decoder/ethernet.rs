//! Ethernet header view and text rendering.

use std::fmt;

use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket};
use pnet::util::MacAddr;

/// Byte size of an Ethernet header: destination + source + ethertype,
/// no padding. Buffers shorter than this are never decoded.
pub const ETHERNET_HEADER_LEN: usize = 14;

/// The fields of one captured frame's Ethernet header.
///
/// Materialized per read and discarded after rendering; it copies the
/// fields out of the capture buffer rather than borrowing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: MacAddr,
    pub source: MacAddr,
    pub ethertype: EtherType,
}

impl EthernetHeader {
    /// Decode the first bytes of `frame` as an Ethernet header.
    ///
    /// Returns `None` when the buffer is too short to contain one.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        let packet = EthernetPacket::new(frame)?;
        Some(Self {
            destination: packet.get_destination(),
            source: packet.get_source(),
            ethertype: packet.get_ethertype(),
        })
    }
}

impl fmt::Display for EthernetHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ether_header-------------------------")?;
        writeln!(f, "ether_dhost={}", format_mac(&self.destination))?;
        writeln!(f, "ether_shost={}", format_mac(&self.source))?;
        write!(
            f,
            "ether_type={:02X}({})",
            self.ethertype.0,
            ethertype_label(self.ethertype)
        )
    }
}

/// Label for the ethertype field. Everything outside the three named
/// protocols renders as `unknown`.
pub fn ethertype_label(ethertype: EtherType) -> &'static str {
    match ethertype {
        EtherTypes::Ipv4 => "IP",
        EtherTypes::Ipv6 => "IPv6",
        EtherTypes::Arp => "ARP",
        _ => "unknown",
    }
}

// Every octet gets a trailing colon, including the last. The original
// tool formats addresses this way and downstream consumers expect the
// output byte for byte.
fn format_mac(mac: &MacAddr) -> String {
    mac.octets().iter().map(|b| format!("{:02x}:", b)).collect()
}
