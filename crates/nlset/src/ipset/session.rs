//! Blocking ipset sessions.
//!
//! A [`Session`] owns one netfilter netlink socket, the protocol version
//! negotiated with the kernel, and the sequence counter. Each request is a
//! single round trip: [`Session::send`] writes it and [`Session::receive`]
//! reads until the matching acknowledgement or error arrives.
//!
//! # Example
//!
//! ```ignore
//! use nlset::{Options, Session};
//!
//! let mut session = Session::open()?;
//! session.create_set("blocklist", Options::default())?;
//! session.add_entry("blocklist", "203.0.113.7".parse()?, Options::default())?;
//! session.close()?;
//! ```

use std::io;
use std::path::Path;
use std::time::Duration;

use bytes::BytesMut;

use super::consts::*;
use super::request::Request;
use super::response::{self, DataMessage, ReplyKind};
use super::types::{Command, Family};
use crate::netlink::message::{NLM_F_ACK, NLM_F_REQUEST};
use crate::netlink::{Error, NetlinkSocket, Result, Transport};

/// Session tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Capacity of the receive buffer, in bytes.
    pub recv_buffer: usize,
    /// Replies for other sequence numbers tolerated per request.
    pub max_stale_replies: usize,
    /// Receive deadline applied to the socket at open.
    pub read_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recv_buffer: 32768,
            max_stale_replies: 3,
            read_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Set the receive deadline.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the stale-reply bound.
    pub fn max_stale_replies(mut self, n: usize) -> Self {
        self.max_stale_replies = n;
        self
    }
}

/// Result of the protocol handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProtocolInfo {
    /// Version used for every request of the session.
    pub protocol: u8,
    /// Highest version the kernel speaks.
    pub kernel_protocol: u8,
    /// Lowest version the kernel speaks.
    pub kernel_protocol_min: u8,
}

/// Revisions of a set type supported by the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeInfo {
    /// Set type name, e.g. `hash:net`.
    pub typename: String,
    /// Family the type was queried for.
    pub family: Family,
    /// Highest supported revision.
    pub revision: u8,
    /// Lowest supported revision.
    pub revision_min: u8,
}

/// Data messages collected before the final acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Sequence number of the request.
    pub seq: u32,
    /// Data messages, in arrival order.
    pub data: Vec<DataMessage>,
}

impl Response {
    /// First data message answering `command`.
    pub fn find(&self, command: Command) -> Option<&DataMessage> {
        self.data.iter().find(|msg| msg.command == command)
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    seq: u32,
    command: Command,
}

/// An open ipset session.
pub struct Session<T: Transport = NetlinkSocket> {
    transport: T,
    config: SessionConfig,
    protocol: ProtocolInfo,
    seq: u32,
    pending: Option<Pending>,
}

impl Session<NetlinkSocket> {
    /// Open a session in the current network namespace.
    pub fn open() -> Result<Self> {
        Self::open_with(SessionConfig::default())
    }

    /// Open a session with custom configuration.
    pub fn open_with(config: SessionConfig) -> Result<Self> {
        let socket = NetlinkSocket::new().map_err(map_socket_error)?;
        Self::start(socket, config)
    }

    /// Open a session inside the network namespace at `ns_path`
    /// (`/var/run/netns/<name>` or `/proc/<pid>/ns/net`).
    pub fn open_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        let socket = NetlinkSocket::new_in_namespace_path(ns_path).map_err(map_socket_error)?;
        Self::start(socket, SessionConfig::default())
    }

    /// Change the receive deadline. `None` blocks forever.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.transport.set_read_timeout(timeout)?;
        self.config.read_timeout = timeout;
        Ok(())
    }

    fn start(socket: NetlinkSocket, config: SessionConfig) -> Result<Self> {
        if config.read_timeout.is_some() {
            socket.set_read_timeout(config.read_timeout)?;
        }
        Self::with_transport(socket, config)
    }
}

/// A missing NETLINK_NETFILTER protocol means there is no ipset either.
fn map_socket_error(err: Error) -> Error {
    match err {
        Error::Socket(ref e) if e.raw_os_error() == Some(libc::EPROTONOSUPPORT) => {
            Error::FamilyNotFound {
                errno: libc::EPROTONOSUPPORT,
            }
        }
        other => other,
    }
}

impl<T: Transport> Session<T> {
    /// Run the protocol handshake over an already bound transport.
    pub fn with_transport(transport: T, config: SessionConfig) -> Result<Self> {
        let mut session = Self {
            transport,
            config,
            protocol: ProtocolInfo {
                protocol: IPSET_PROTOCOL,
                kernel_protocol: IPSET_PROTOCOL,
                kernel_protocol_min: IPSET_PROTOCOL_MIN,
            },
            seq: 1,
            pending: None,
        };
        session.handshake()?;
        Ok(session)
    }

    /// Negotiated protocol version.
    pub fn protocol(&self) -> u8 {
        self.protocol.protocol
    }

    /// Full handshake result.
    pub fn protocol_info(&self) -> ProtocolInfo {
        self.protocol
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Kernel port id of the socket.
    pub fn port_id(&self) -> u32 {
        self.transport.port_id()
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the socket.
    pub fn close(self) -> Result<()> {
        tracing::debug!(port_id = self.transport.port_id(), "closing ipset session");
        Ok(())
    }

    fn handshake(&mut self) -> Result<()> {
        let response = match self.query_protocol(IPSET_PROTOCOL) {
            Err(Error::Kernel { errno, .. }) if errno == IPSET_ERR_PROTOCOL => {
                tracing::debug!(
                    protocol = IPSET_PROTOCOL_MIN,
                    "kernel rejected protocol {}, retrying",
                    IPSET_PROTOCOL
                );
                match self.query_protocol(IPSET_PROTOCOL_MIN) {
                    Err(Error::Kernel { errno, .. }) if errno == IPSET_ERR_PROTOCOL => {
                        return Err(Error::UnsupportedProtocol { kernel: None });
                    }
                    other => other?,
                }
            }
            other => other?,
        };

        let data = response
            .find(Command::Protocol)
            .ok_or_else(|| Error::MalformedReply("protocol reply carries no data".into()))?;
        let kernel = data
            .attr(IPSET_ATTR_PROTOCOL)
            .ok_or_else(|| Error::MalformedReply("protocol reply without version".into()))?
            .as_u8()?;
        let kernel_min = match data.attr(IPSET_ATTR_PROTOCOL_MIN) {
            Some(attr) => attr.as_u8()?,
            None => kernel,
        };

        if kernel < IPSET_PROTOCOL_MIN || kernel_min > IPSET_PROTOCOL {
            return Err(Error::UnsupportedProtocol {
                kernel: Some(kernel),
            });
        }

        self.protocol = ProtocolInfo {
            protocol: kernel.min(IPSET_PROTOCOL),
            kernel_protocol: kernel,
            kernel_protocol_min: kernel_min,
        };
        tracing::debug!(
            protocol = self.protocol.protocol,
            kernel,
            kernel_min,
            "ipset protocol negotiated"
        );
        Ok(())
    }

    /// Send `IPSET_CMD_PROTOCOL` carrying `protocol`.
    fn query_protocol(&mut self, protocol: u8) -> Result<Response> {
        self.send(&Request::protocol(protocol, NLM_F_REQUEST | NLM_F_ACK))?;
        match self.receive() {
            Err(Error::Kernel { errno, .. })
                if matches!(errno, libc::EOPNOTSUPP | libc::EPROTONOSUPPORT | libc::ENOENT) =>
            {
                Err(Error::FamilyNotFound { errno })
            }
            other => other,
        }
    }

    fn next_seq(&mut self) -> u32 {
        let seq = self.seq;
        self.seq = match self.seq.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        seq
    }

    /// Frame and write a request, returning its sequence number.
    ///
    /// The request becomes the pending one; a previous request that was
    /// never received is abandoned and its reply will be discarded as stale.
    pub fn send(&mut self, request: &Request) -> Result<u32> {
        let mut builder = request.build()?;
        let seq = self.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.transport.port_id());
        let msg = builder.finish();

        if let Some(prev) = self.pending.take() {
            tracing::debug!(seq = prev.seq, "abandoning unanswered request");
        }

        self.write_all(&msg)?;
        tracing::trace!(
            seq,
            command = %request.command(),
            flags = request.flags(),
            len = msg.len(),
            "request sent"
        );

        self.pending = Some(Pending {
            seq,
            command: request.command(),
        });
        Ok(seq)
    }

    /// Read replies until the pending request is acknowledged or rejected.
    ///
    /// Replies for other sequence numbers are discarded; more than
    /// `max_stale_replies` of them fail the call with
    /// [`Error::ProtocolDesync`].
    pub fn receive(&mut self) -> Result<Response> {
        let pending = self.pending.take().ok_or(Error::NoPendingRequest)?;
        let mut response = Response {
            seq: pending.seq,
            data: Vec::new(),
        };
        let mut stale = 0usize;

        loop {
            let buf = self.read_datagram()?;

            for reply in response::parse(&buf)? {
                if reply.seq != pending.seq {
                    stale += 1;
                    tracing::debug!(
                        expected = pending.seq,
                        actual = reply.seq,
                        stale,
                        "discarding stale reply"
                    );
                    if stale > self.config.max_stale_replies {
                        return Err(Error::ProtocolDesync {
                            expected: pending.seq,
                            actual: reply.seq,
                        });
                    }
                    continue;
                }

                match reply.kind {
                    ReplyKind::Data(data) => response.data.push(data),
                    ReplyKind::Ack | ReplyKind::Done => return Ok(response),
                    ReplyKind::Error(errno) => {
                        tracing::debug!(
                            seq = pending.seq,
                            command = %pending.command,
                            errno,
                            "kernel rejected request"
                        );
                        return Err(Error::kernel(pending.command, errno));
                    }
                }
            }
        }
    }

    /// Send a request and wait for its response.
    pub fn request(&mut self, request: &Request) -> Result<Response> {
        self.send(request)?;
        self.receive()
    }

    /// Query the revision range of a set type.
    pub fn type_revision(&mut self, typename: &str, family: Family) -> Result<TypeInfo> {
        let request = Request::type_query(
            self.protocol.protocol,
            typename,
            family,
            NLM_F_REQUEST | NLM_F_ACK,
        );
        let response = self.request(&request)?;

        let data = response
            .find(Command::Type)
            .ok_or_else(|| Error::MalformedReply("type reply carries no data".into()))?;
        let revision = data
            .attr(IPSET_ATTR_REVISION)
            .ok_or_else(|| Error::MalformedReply("type reply without revision".into()))?
            .as_u8()?;
        let revision_min = match data.attr(IPSET_ATTR_REVISION_MIN) {
            Some(attr) => attr.as_u8()?,
            None => revision,
        };

        Ok(TypeInfo {
            typename: typename.to_string(),
            family,
            revision,
            revision_min,
        })
    }

    fn write_all(&self, mut msg: &[u8]) -> Result<()> {
        while !msg.is_empty() {
            match self.transport.send(msg) {
                Ok(0) => {
                    return Err(Error::Socket(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "netlink socket accepted no data",
                    )));
                }
                Ok(n) => {
                    if n < msg.len() {
                        tracing::trace!(written = n, remaining = msg.len() - n, "partial write");
                    }
                    msg = &msg[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_datagram(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(self.config.recv_buffer);
        loop {
            match self.transport.recv(&mut buf) {
                Ok(0) => {
                    return Err(Error::Socket(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "netlink socket returned no data",
                    )));
                }
                Ok(_) => return Ok(buf),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
