//! Parsing of kernel replies.

use super::types::Command;
use crate::netlink::attr::{self, Attribute};
use crate::netlink::message::{MessageIter, NlMsgError, NlMsgType};
use crate::netlink::nfnl::{NFNL_SUBSYS_IPSET, NfGenMsg, split_msg_type};
use crate::netlink::{Error, Result};

/// One message of a kernel reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Sequence number echoed by the kernel.
    pub seq: u32,
    /// What the message says.
    pub kind: ReplyKind,
}

/// Kinds of reply messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKind {
    /// `NLMSG_ERROR` with code 0.
    Ack,
    /// `NLMSG_ERROR` with a positive errno.
    Error(i32),
    /// `NLMSG_DONE`.
    Done,
    /// An ipset data message (protocol or type information).
    Data(DataMessage),
}

impl ReplyKind {
    /// Whether this message completes the request.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Data(_))
    }
}

/// An ipset data message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMessage {
    /// Command the kernel answered.
    pub command: Command,
    /// nfgenmsg family byte.
    pub family: u8,
    /// Decoded attributes.
    pub attrs: Vec<Attribute>,
}

impl DataMessage {
    /// Find a top-level attribute.
    pub fn attr(&self, kind: u16) -> Option<&Attribute> {
        attr::find(&self.attrs, kind)
    }
}

/// Parse every message in a datagram.
///
/// `NLMSG_NOOP` is dropped. Framing errors fail the whole buffer.
pub fn parse(buf: &[u8]) -> Result<Vec<Reply>> {
    let mut replies = Vec::new();

    for msg in MessageIter::new(buf) {
        let (header, payload) = msg?;
        let seq = header.nlmsg_seq;

        let kind = match header.nlmsg_type {
            NlMsgType::NOOP => continue,
            NlMsgType::ERROR => {
                let err = NlMsgError::from_bytes(payload)?;
                match err.errno() {
                    _ if err.is_ack() => ReplyKind::Ack,
                    errno if errno > 0 => ReplyKind::Error(errno),
                    _ => {
                        return Err(Error::MalformedReply(format!(
                            "error code {} is not a negative errno",
                            err.error
                        )));
                    }
                }
            }
            NlMsgType::DONE => ReplyKind::Done,
            msg_type => ReplyKind::Data(parse_data(msg_type, payload)?),
        };

        replies.push(Reply { seq, kind });
    }

    Ok(replies)
}

fn parse_data(msg_type: u16, payload: &[u8]) -> Result<DataMessage> {
    let (subsys, cmd) = split_msg_type(msg_type);
    if subsys != NFNL_SUBSYS_IPSET {
        return Err(Error::MalformedReply(format!(
            "unexpected message type {:#06x}",
            msg_type
        )));
    }
    let command = Command::from_u8(cmd)
        .ok_or_else(|| Error::MalformedReply(format!("unknown ipset command {}", cmd)))?;

    let (nfgen, rest) = NfGenMsg::split(payload)?;
    Ok(DataMessage {
        command,
        family: nfgen.family,
        attrs: attr::decode(rest)?,
    })
}
