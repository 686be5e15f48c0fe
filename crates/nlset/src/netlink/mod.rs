//! Netlink plumbing for the ipset client.
//!
//! This module holds the pieces that are not specific to ipset: the
//! attribute codec, message framing, the nfnetlink header and the blocking
//! socket.
//!
//! # Framing
//!
//! ```text
//! ┌────────────┬───────────┬──────────────────────────┐
//! │ nlmsghdr   │ nfgenmsg  │ attributes (TLV, nested) │
//! │ 16 bytes   │ 4 bytes   │ 4-byte aligned           │
//! └────────────┴───────────┴──────────────────────────┘
//! ```

pub mod attr;
mod builder;
mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod message;
pub mod nfnl;
mod socket;

pub use attr::{Attribute, AttrValue, NlAttr};
pub use builder::MessageBuilder;
pub use error::{Error, KernelError, Result, describe_errno};
pub use message::{MessageIter, NlMsgError, NlMsgHdr};
pub use nfnl::NfGenMsg;
pub use socket::{NetlinkSocket, Transport};
