//! Pantau - Ethernet frame listener
//!
//! Captures raw link-layer frames from a single network interface and
//! renders each frame's Ethernet header. The capture socket is an
//! `AF_PACKET` raw socket bound to the interface, optionally in
//! promiscuous mode and optionally filtered to IPv4 frames only.

pub mod capture;
pub mod decoder;
pub mod error;
pub mod listener;

pub use capture::{CaptureConfig, FrameSource};
pub use decoder::EthernetHeader;
pub use error::CaptureError;
pub use listener::FrameListener;

#[cfg(target_os = "linux")]
pub use capture::RawCapture;
