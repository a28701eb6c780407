//! The frame read/decode loop.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::capture::FrameSource;
use crate::decoder::{EthernetHeader, ETHERNET_HEADER_LEN};

/// Capacity of the reused read buffer. Generously larger than a
/// standard Ethernet frame so frames are not truncated in the common
/// case.
pub const CAPTURE_BUFFER_LEN: usize = 2048;

/// Delay inserted after a failed read so a persistent error (interface
/// down, permissions revoked) cannot spin the loop at full CPU.
const READ_ERROR_DELAY: Duration = Duration::from_millis(10);

/// Reads frames from a `FrameSource` until cancelled, rendering each
/// Ethernet header to an output sink.
///
/// Single-threaded and strictly sequential: one blocking read at a
/// time against one reused buffer. Read errors and short frames are
/// reported and skipped; only a failure to write the output sink is
/// fatal. Receive timeouts and interrupted reads are expected wakeups
/// that just re-check the cancellation flag.
pub struct FrameListener {
    running: Arc<AtomicBool>,
    buffer: [u8; CAPTURE_BUFFER_LEN],
}

impl FrameListener {
    /// Create a listener that runs while `running` is true.
    ///
    /// Clearing the flag from a signal handler stops the loop within
    /// one receive timeout: the next timeout (or EINTR) wakeup
    /// re-checks the flag before reading again, so cancellation works
    /// even when no frames arrive.
    pub fn new(running: Arc<AtomicBool>) -> Self {
        Self {
            running,
            buffer: [0; CAPTURE_BUFFER_LEN],
        }
    }

    /// Run the capture loop. Returns `Ok(())` once cancelled.
    pub fn run<S, W>(&mut self, source: &mut S, out: &mut W) -> io::Result<()>
    where
        S: FrameSource + ?Sized,
        W: Write,
    {
        while self.running.load(Ordering::SeqCst) {
            match source.recv(&mut self.buffer) {
                Ok(len) if len >= ETHERNET_HEADER_LEN => {
                    if let Some(header) = EthernetHeader::parse(&self.buffer[..len]) {
                        writeln!(out, "{}", header)?;
                    }
                }
                Ok(len) if len > 0 => {
                    tracing::warn!("read size({}) < {}", len, ETHERNET_HEADER_LEN);
                }
                Ok(_) => {
                    tracing::error!("read returned no data");
                    thread::sleep(READ_ERROR_DELAY);
                }
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut =>
                {
                    // Receive timeout; loop around to re-check the flag.
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    // Signal delivery lands here; the loop condition
                    // decides whether to keep going.
                }
                Err(e) => {
                    tracing::error!("read failed: {}", e);
                    thread::sleep(READ_ERROR_DELAY);
                }
            }
        }
        out.flush()
    }
}
