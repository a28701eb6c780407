use std::io;
use thiserror::Error;

/// Errors raised while acquiring a capture socket.
///
/// One variant per setup step, so callers and tests can tell which step
/// failed. Every variant carries the underlying OS error; a permission
/// failure surfaces through the same variant as any other OS failure.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to create raw socket: {0}")]
    SocketCreation(#[source] io::Error),

    #[error("interface lookup failed for '{name}': {source}")]
    InterfaceLookup { name: String, source: io::Error },

    #[error("failed to bind to interface '{name}': {source}")]
    Bind { name: String, source: io::Error },

    #[error("failed to enable promiscuous mode on '{name}': {source}")]
    PromiscuousMode { name: String, source: io::Error },
}
