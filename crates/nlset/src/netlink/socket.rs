//! Low-level blocking netlink socket operations.

use std::fs::File;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::time::Duration;

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};

use super::error::{Error, Result};

/// A datagram channel to the kernel.
///
/// [`NetlinkSocket`] is the real implementation; the session logic only
/// depends on this trait so it can run against scripted transports.
pub trait Transport {
    /// Send one datagram, returning the number of bytes written.
    fn send(&self, buf: &[u8]) -> io::Result<usize>;

    /// Receive one datagram into the spare capacity of `buf`.
    fn recv(&self, buf: &mut BytesMut) -> io::Result<usize>;

    /// Local port id assigned by the kernel.
    fn port_id(&self) -> u32;
}

/// Blocking NETLINK_NETFILTER socket.
pub struct NetlinkSocket {
    socket: Socket,
    /// Local port ID (assigned by kernel).
    pid: u32,
}

impl NetlinkSocket {
    /// Create a new netfilter netlink socket in the current namespace.
    pub fn new() -> Result<Self> {
        Self::create_socket()
    }

    /// Create a socket that operates in a specific network namespace.
    ///
    /// The namespace is specified by an open file descriptor to a namespace
    /// file (e.g., `/proc/<pid>/ns/net` or `/var/run/netns/<name>`).
    ///
    /// The calling thread switches to the target namespace, creates the
    /// socket, then switches back. The socket keeps operating in the target
    /// namespace.
    pub fn new_in_namespace(ns_fd: RawFd) -> Result<Self> {
        // Save the current namespace so we can restore it
        let current_ns = File::open("/proc/self/ns/net").map_err(|e| {
            Error::Socket(io::Error::new(
                e.kind(),
                format!("cannot open current namespace: {}", e),
            ))
        })?;
        let current_ns_fd = current_ns.as_raw_fd();

        // SAFETY: libc::setns switches the calling thread to the namespace
        // specified by ns_fd, which the caller keeps open for this call.
        let ret = unsafe { libc::setns(ns_fd, libc::CLONE_NEWNET) };
        if ret < 0 {
            return Err(Error::Socket(io::Error::last_os_error()));
        }

        let result = Self::create_socket();

        // SAFETY: current_ns_fd is valid (opened from /proc/self/ns/net above).
        let restore_ret = unsafe { libc::setns(current_ns_fd, libc::CLONE_NEWNET) };
        if restore_ret < 0 {
            tracing::warn!(
                error = %io::Error::last_os_error(),
                "failed to restore original network namespace"
            );
        }

        result
    }

    /// Create a socket in the network namespace at `ns_path`.
    pub fn new_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        let ns_path = ns_path.as_ref();
        let ns_file = File::open(ns_path).map_err(|e| {
            Error::Socket(io::Error::new(
                e.kind(),
                format!("cannot open namespace '{}': {}", ns_path.display(), e),
            ))
        })?;
        Self::new_in_namespace(ns_file.as_raw_fd())
    }

    fn create_socket() -> Result<Self> {
        let mut socket = Socket::new(protocols::NETLINK_NETFILTER)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        // Extended ACK is informational only
        socket.set_ext_ack(true).ok();

        tracing::debug!(pid, "netfilter socket bound");
        Ok(Self { socket, pid })
    }

    /// Get the local port ID.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Set the receive deadline (`SO_RCVTIMEO`). `None` blocks forever.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(Duration::ZERO);
        let tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };

        // SAFETY: tv is a valid timeval that outlives the call and the length
        // passed matches its size.
        let ret = unsafe {
            libc::setsockopt(
                self.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_RCVTIMEO,
                &tv as *const libc::timeval as *const libc::c_void,
                std::mem::size_of::<libc::timeval>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(Error::Socket(io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl Transport for NetlinkSocket {
    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.socket.send(buf, 0)
    }

    fn recv(&self, buf: &mut BytesMut) -> io::Result<usize> {
        self.socket.recv(buf, 0)
    }

    fn port_id(&self) -> u32 {
        self.pid
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}
