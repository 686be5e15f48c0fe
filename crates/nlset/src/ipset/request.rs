//! ipset request messages.
//!
//! A request is an nfnetlink message for the ipset subsystem:
//!
//! ```text
//! nlmsghdr | nfgenmsg(family) | PROTOCOL | SETNAME | [TYPENAME REVISION FAMILY] | [DATA { IP { IPADDR } CIDR TIMEOUT }]
//! ```

use std::net::IpAddr;

use super::consts::*;
use super::entry::Entry;
use super::types::{Command, Family, SetName};
use crate::netlink::attr::Attribute;
use crate::netlink::nfnl::{NFNL_SUBSYS_IPSET, msg_type};
use crate::netlink::{MessageBuilder, Result};

/// An ipset request before framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: Command,
    family: u8,
    flags: u16,
    attrs: Vec<Attribute>,
}

impl Request {
    /// Start a request carrying the protocol attribute.
    pub fn new(command: Command, protocol: u8, flags: u16) -> Self {
        Self {
            command,
            family: NFPROTO_IPV4,
            flags,
            attrs: vec![Attribute::u8(IPSET_ATTR_PROTOCOL, protocol)],
        }
    }

    /// `IPSET_CMD_PROTOCOL`: ask the kernel which protocol versions it speaks.
    ///
    /// Kernels that only know protocol 6 reject any other `protocol` value.
    pub fn protocol(protocol: u8, flags: u16) -> Self {
        Self::new(Command::Protocol, protocol, flags)
    }

    /// `IPSET_CMD_TYPE`: ask for the supported revisions of a set type.
    pub fn type_query(protocol: u8, typename: &str, family: Family, flags: u16) -> Self {
        Self::new(Command::Type, protocol, flags)
            .family(family)
            .attr(Attribute::string(IPSET_ATTR_TYPENAME, typename))
            .attr(Attribute::u8(IPSET_ATTR_FAMILY, family.nfproto()))
    }

    /// `IPSET_CMD_CREATE` for a `hash:net` set.
    ///
    /// A non-zero `timeout` becomes the set's default entry timeout and
    /// enables per-entry timeouts.
    pub fn create(
        protocol: u8,
        name: &SetName,
        revision: u8,
        family: Family,
        timeout: u32,
        flags: u16,
    ) -> Self {
        let mut req = Self::set(Command::Create, protocol, name, flags)
            .family(family)
            .attr(Attribute::string(IPSET_ATTR_TYPENAME, SET_TYPE_HASH_NET))
            .attr(Attribute::u8(IPSET_ATTR_REVISION, revision))
            .attr(Attribute::u8(IPSET_ATTR_FAMILY, family.nfproto()));
        if timeout != 0 {
            req = req.attr(Attribute::nested(
                IPSET_ATTR_DATA,
                vec![Attribute::u32_be(IPSET_ATTR_TIMEOUT, timeout)],
            ));
        }
        req
    }

    /// A set-level request (`destroy`, `flush`, ...).
    pub fn set(command: Command, protocol: u8, name: &SetName, flags: u16) -> Self {
        Self::new(command, protocol, flags).attr(Attribute::string(IPSET_ATTR_SETNAME, name.as_str()))
    }

    /// An entry-level request (`add`, `del`, `test`).
    pub fn entry(
        command: Command,
        protocol: u8,
        name: &SetName,
        entry: &Entry,
        timeout: u32,
        flags: u16,
    ) -> Self {
        Self::set(command, protocol, name, flags)
            .family(entry.family())
            .attr(data_block(entry, timeout))
    }

    /// Set the nfgenmsg family.
    pub fn family(mut self, family: Family) -> Self {
        self.family = family.nfproto();
        self
    }

    /// Append an attribute.
    pub fn attr(mut self, attr: Attribute) -> Self {
        self.attrs.push(attr);
        self
    }

    /// The request command.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Netlink flags of the request.
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Top-level attributes in wire order.
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Frame the request. Sequence number and port id are filled in by the
    /// session.
    pub fn build(&self) -> Result<MessageBuilder> {
        let mut builder = MessageBuilder::new(msg_type(NFNL_SUBSYS_IPSET, self.command as u8), self.flags);
        builder.append_nfgen(self.family);
        builder.append_attributes(&self.attrs)?;
        Ok(builder)
    }
}

/// `IPSET_ATTR_IP { IPSET_ATTR_IPADDR_IPV4 | IPSET_ATTR_IPADDR_IPV6 }`.
pub fn ip_attr(addr: IpAddr) -> Attribute {
    let inner = match addr {
        IpAddr::V4(v4) => Attribute::leaf(IPSET_ATTR_IPADDR_IPV4, v4.octets()),
        IpAddr::V6(v6) => Attribute::leaf(IPSET_ATTR_IPADDR_IPV6, v6.octets()),
    };
    Attribute::nested(IPSET_ATTR_IP, vec![inner.with_net_byteorder()])
}

/// The `IPSET_ATTR_DATA` block for one entry.
pub fn data_block(entry: &Entry, timeout: u32) -> Attribute {
    let mut children = vec![ip_attr(entry.ip())];
    if let Some(prefix) = entry.prefix() {
        children.push(Attribute::u8(IPSET_ATTR_CIDR, prefix));
    }
    if timeout != 0 {
        children.push(Attribute::u32_be(IPSET_ATTR_TIMEOUT, timeout));
    }
    Attribute::nested(IPSET_ATTR_DATA, children)
}
