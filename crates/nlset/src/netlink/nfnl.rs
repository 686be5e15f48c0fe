//! nfnetlink framing.
//!
//! Every NETLINK_NETFILTER message carries a 4-byte `struct nfgenmsg` right
//! after the netlink header, and its message type packs the subsystem id in
//! the high byte and the subsystem command in the low byte.

use winnow::binary::{be_u16, le_u8};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

use super::error::{Error, Result};

/// Parser result type for fixed headers.
pub type PResult<T> = core::result::Result<T, ErrMode<ContextError>>;

/// nfnetlink subsystem id of ipset.
pub const NFNL_SUBSYS_IPSET: u8 = 6;

/// nfnetlink header version.
pub const NFNETLINK_V0: u8 = 0;

/// Size of the nfgenmsg header.
pub const NFGENMSG_LEN: usize = 4;

/// Build the netlink message type for a subsystem command.
#[inline]
pub const fn msg_type(subsys: u8, cmd: u8) -> u16 {
    ((subsys as u16) << 8) | cmd as u16
}

/// Split a netlink message type into `(subsystem, command)`.
#[inline]
pub const fn split_msg_type(msg_type: u16) -> (u8, u8) {
    ((msg_type >> 8) as u8, (msg_type & 0xff) as u8)
}

/// nfgenmsg header (4 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NfGenMsg {
    /// Address family (NFPROTO_*).
    pub family: u8,
    /// Always [`NFNETLINK_V0`].
    pub version: u8,
    /// Resource id, big endian on the wire.
    pub res_id: u16,
}

impl NfGenMsg {
    /// Create a header for the given family.
    pub fn new(family: u8) -> Self {
        Self {
            family,
            version: NFNETLINK_V0,
            res_id: 0,
        }
    }

    /// Wire representation.
    pub fn as_bytes(&self) -> [u8; NFGENMSG_LEN] {
        let res = self.res_id.to_be_bytes();
        [self.family, self.version, res[0], res[1]]
    }

    /// Parse the header, advancing `input` past it.
    pub fn parse(input: &mut &[u8]) -> PResult<Self> {
        (le_u8, le_u8, be_u16)
            .map(|(family, version, res_id)| Self {
                family,
                version,
                res_id,
            })
            .parse_next(input)
    }

    /// Split a message payload into the header and the attribute bytes.
    pub fn split(payload: &[u8]) -> Result<(Self, &[u8])> {
        let mut input = payload;
        let header = Self::parse(&mut input).map_err(|_| {
            Error::MalformedReply(format!(
                "truncated nfgenmsg header: {} bytes",
                payload.len()
            ))
        })?;
        Ok((header, input))
    }
}
