//! AF_PACKET raw socket capture.
//!
//! Acquisition runs in a fixed order: create the socket with the
//! protocol filter, resolve the interface index, bind, then enable
//! promiscuous mode if requested. Each step fails with its own
//! `CaptureError` variant, and the descriptor is closed on every exit
//! path because it is held in an `OwnedFd` from the moment it exists.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

use crate::capture::{CaptureConfig, FrameSource};
use crate::error::CaptureError;

/// Longest interface name the kernel accepts. Longer names are
/// truncated silently at this layer; the CLI warns about them first.
pub const MAX_INTERFACE_NAME_LEN: usize = libc::IF_NAMESIZE - 1;

/// Receive timeout on the capture socket. A blocked read wakes at
/// least this often, so the read loop can observe cancellation even
/// when the interface is completely idle. SIGINT handlers installed
/// with SA_RESTART (as ctrlc does) never interrupt the read
/// themselves; the timeout is what guarantees the flag gets re-checked.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// A raw capture socket bound to a single interface.
///
/// Requires CAP_NET_RAW (and CAP_NET_ADMIN for promiscuous mode); a
/// missing capability surfaces as an ordinary OS error from the failing
/// step. Reads time out after `READ_TIMEOUT` with `WouldBlock`.
/// Dropping the handle closes the socket.
#[derive(Debug)]
pub struct RawCapture {
    fd: OwnedFd,
    interface: String,
    ifindex: libc::c_int,
    protocol: u16,
}

impl RawCapture {
    /// Open a capture socket as described by `config`.
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let protocol = if config.ip_only {
            libc::ETH_P_IP
        } else {
            libc::ETH_P_ALL
        } as u16;

        let fd = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW,
                protocol.to_be() as libc::c_int,
            )
        };
        if fd < 0 {
            return Err(CaptureError::SocketCreation(io::Error::last_os_error()));
        }
        // Owned from here on; every early return below closes it.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        let timeout = libc::timeval {
            tv_sec: READ_TIMEOUT.as_secs() as libc::time_t,
            tv_usec: READ_TIMEOUT.subsec_micros() as libc::suseconds_t,
        };
        let ret = unsafe {
            libc::setsockopt(
                fd.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_RCVTIMEO,
                &timeout as *const libc::timeval as *const libc::c_void,
                mem::size_of::<libc::timeval>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(CaptureError::SocketCreation(io::Error::last_os_error()));
        }

        let mut ifreq = ifreq_for(&config.interface);
        let ret = unsafe {
            libc::ioctl(
                fd.as_raw_fd(),
                libc::SIOCGIFINDEX,
                &mut ifreq as *mut libc::ifreq,
            )
        };
        if ret < 0 {
            return Err(CaptureError::InterfaceLookup {
                name: config.interface.clone(),
                source: io::Error::last_os_error(),
            });
        }
        let ifindex = unsafe { ifreq.ifr_ifru.ifru_ifindex };

        let mut sll: libc::sockaddr_ll = unsafe { mem::zeroed() };
        sll.sll_family = libc::AF_PACKET as libc::sa_family_t;
        sll.sll_protocol = protocol.to_be();
        sll.sll_ifindex = ifindex;
        let ret = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                &sll as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(CaptureError::Bind {
                name: config.interface.clone(),
                source: io::Error::last_os_error(),
            });
        }

        // Promiscuous mode goes last: it mutates interface state visible
        // to other processes and must not be applied when the earlier
        // steps prove the interface unusable.
        if config.promiscuous {
            let mut ifreq = ifreq_for(&config.interface);
            let ret = unsafe {
                libc::ioctl(
                    fd.as_raw_fd(),
                    libc::SIOCGIFFLAGS,
                    &mut ifreq as *mut libc::ifreq,
                )
            };
            if ret < 0 {
                return Err(CaptureError::PromiscuousMode {
                    name: config.interface.clone(),
                    source: io::Error::last_os_error(),
                });
            }
            unsafe {
                ifreq.ifr_ifru.ifru_flags |= libc::IFF_PROMISC as libc::c_short;
            }
            let ret = unsafe {
                libc::ioctl(
                    fd.as_raw_fd(),
                    libc::SIOCSIFFLAGS,
                    &mut ifreq as *mut libc::ifreq,
                )
            };
            if ret < 0 {
                return Err(CaptureError::PromiscuousMode {
                    name: config.interface.clone(),
                    source: io::Error::last_os_error(),
                });
            }
        }

        Ok(Self {
            fd,
            interface: config.interface.clone(),
            ifindex,
            protocol,
        })
    }

    /// Name of the interface the socket is bound to.
    pub fn interface_name(&self) -> &str {
        &self.interface
    }

    /// Index of the interface the socket is bound to.
    pub fn ifindex(&self) -> i32 {
        self.ifindex
    }

    /// The link-layer protocol filter in effect (ETH_P_IP or ETH_P_ALL),
    /// in host byte order.
    pub fn protocol(&self) -> u16 {
        self.protocol
    }
}

impl FrameSource for RawCapture {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
            )
        };
        if len < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(len as usize)
        }
    }
}

impl AsRawFd for RawCapture {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

/// Build a zeroed `ifreq` carrying `name`, truncated to the kernel's
/// name limit and NUL terminated.
fn ifreq_for(name: &str) -> libc::ifreq {
    let mut ifreq: libc::ifreq = unsafe { mem::zeroed() };
    for (dst, src) in ifreq
        .ifr_name
        .iter_mut()
        .zip(name.as_bytes().iter().take(MAX_INTERFACE_NAME_LEN))
    {
        *dst = *src as libc::c_char;
    }
    ifreq
}

#[cfg(test)]
mod tests {
    use super::*;

    mod ifreq_tests {
        use super::*;

        #[test]
        fn short_name_is_copied_and_terminated() {
            let ifreq = ifreq_for("eth0");
            let name: Vec<u8> = ifreq.ifr_name.iter().map(|&c| c as u8).collect();
            assert_eq!(&name[..4], b"eth0");
            assert!(name[4..].iter().all(|&b| b == 0));
        }

        #[test]
        fn long_name_is_truncated_with_nul() {
            let long = "averylonginterfacename0";
            assert!(long.len() > MAX_INTERFACE_NAME_LEN);

            let ifreq = ifreq_for(long);
            let name: Vec<u8> = ifreq.ifr_name.iter().map(|&c| c as u8).collect();
            assert_eq!(
                &name[..MAX_INTERFACE_NAME_LEN],
                &long.as_bytes()[..MAX_INTERFACE_NAME_LEN]
            );
            assert_eq!(name[MAX_INTERFACE_NAME_LEN], 0);
        }
    }

    mod open_tests {
        use super::*;
        use crate::capture::CaptureConfig;

        fn open_fd_count() -> usize {
            std::fs::read_dir("/proc/self/fd").unwrap().count()
        }

        #[test]
        fn nonexistent_interface_fails_lookup() {
            let config = CaptureConfig::new("pantau-none0");
            match RawCapture::open(&config) {
                Err(CaptureError::InterfaceLookup { name, .. }) => {
                    assert_eq!(name, "pantau-none0");
                }
                // Without CAP_NET_RAW the socket itself cannot be created.
                Err(CaptureError::SocketCreation(_)) => {}
                other => panic!("unexpected result: {:?}", other.map(|_| ())),
            }
        }

        #[test]
        fn empty_interface_name_fails_lookup() {
            let config = CaptureConfig::new("");
            match RawCapture::open(&config) {
                Err(CaptureError::InterfaceLookup { .. }) => {}
                Err(CaptureError::SocketCreation(_)) => {}
                other => panic!("unexpected result: {:?}", other.map(|_| ())),
            }
        }

        #[test]
        fn repeated_failed_acquisition_leaks_no_descriptors() {
            // With CAP_NET_RAW each attempt creates a socket before the
            // lookup fails; without it, creation itself fails. Either
            // way the descriptor table must not grow.
            let before = open_fd_count();
            for _ in 0..100 {
                let _ = RawCapture::open(&CaptureConfig::new("pantau-none0"));
            }
            assert_eq!(open_fd_count(), before);
        }
    }
}
