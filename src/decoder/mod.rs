//! Ethernet header decoding and rendering.

mod ethernet;

pub use ethernet::{ethertype_label, EthernetHeader, ETHERNET_HEADER_LEN};
