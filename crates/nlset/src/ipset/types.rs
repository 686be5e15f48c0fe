//! Set names, families, commands and per-call options.

use std::fmt;
use std::net::IpAddr;

use super::consts::*;
use crate::netlink::{Error, Result};

/// A validated ipset name.
///
/// At most `IPSET_MAXNAMELEN - 1` bytes, not empty, no NUL bytes. Names are
/// rejected rather than truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetName(String);

impl SetName {
    /// Maximum name length in bytes.
    pub const MAX_LEN: usize = IPSET_MAXNAMELEN - 1;

    /// Validate and wrap a set name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        let reason = if name.is_empty() {
            Some("empty name")
        } else if name.len() > Self::MAX_LEN {
            Some("name too long (max 31 bytes)")
        } else if name.contains('\0') {
            Some("name contains a NUL byte")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidSetName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for SetName {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

impl TryFrom<String> for SetName {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl AsRef<str> for SetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address family of a set or entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Family {
    /// IPv4.
    #[default]
    Inet,
    /// IPv6.
    Inet6,
}

impl Family {
    /// The `NFPROTO_*` value carried on the wire.
    pub fn nfproto(self) -> u8 {
        match self {
            Self::Inet => NFPROTO_IPV4,
            Self::Inet6 => NFPROTO_IPV6,
        }
    }

    /// Map an `NFPROTO_*` value back to a family.
    pub fn from_nfproto(value: u8) -> Option<Self> {
        match value {
            NFPROTO_IPV4 => Some(Self::Inet),
            NFPROTO_IPV6 => Some(Self::Inet6),
            _ => None,
        }
    }

    /// Family of an address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::Inet,
            IpAddr::V6(_) => Self::Inet6,
        }
    }

    /// Maximum prefix length for this family.
    pub fn max_prefix(self) -> u8 {
        match self {
            Self::Inet => 32,
            Self::Inet6 => 128,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inet => f.write_str("inet"),
            Self::Inet6 => f.write_str("inet6"),
        }
    }
}

/// Per-operation options.
///
/// ```
/// use nlset::Options;
///
/// let opts = Options { timeout: 300, ..Options::default() };
/// assert!(!opts.ipv6);
/// assert!(!opts.excl);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Use inet6 instead of inet.
    pub ipv6: bool,
    /// Kernel-side expiry in seconds; 0 means none.
    pub timeout: u32,
    /// Fail with `AlreadyExists`/`NotFound` instead of succeeding silently.
    pub excl: bool,
}

impl Options {
    /// Family selected by the `ipv6` flag.
    pub fn family(&self) -> Family {
        if self.ipv6 { Family::Inet6 } else { Family::Inet }
    }
}

/// ipset command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Negotiate the protocol version.
    Protocol = 1,
    /// Create a set.
    Create = 2,
    /// Destroy a set.
    Destroy = 3,
    /// Remove every entry of a set.
    Flush = 4,
    /// Rename a set.
    Rename = 5,
    /// Swap the contents of two sets.
    Swap = 6,
    /// List sets and their entries.
    List = 7,
    /// List sets in restorable form.
    Save = 8,
    /// Add an entry.
    Add = 9,
    /// Delete an entry.
    Del = 10,
    /// Test entry membership.
    Test = 11,
    /// Query set header data.
    Header = 12,
    /// Query the revisions of a set type.
    Type = 13,
}

impl Command {
    /// Map a raw command code.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::Protocol,
            2 => Self::Create,
            3 => Self::Destroy,
            4 => Self::Flush,
            5 => Self::Rename,
            6 => Self::Swap,
            7 => Self::List,
            8 => Self::Save,
            9 => Self::Add,
            10 => Self::Del,
            11 => Self::Test,
            12 => Self::Header,
            13 => Self::Type,
            _ => return None,
        })
    }

    /// Lowercase command name as used by the ipset tool.
    pub fn name(self) -> &'static str {
        match self {
            Self::Protocol => "protocol",
            Self::Create => "create",
            Self::Destroy => "destroy",
            Self::Flush => "flush",
            Self::Rename => "rename",
            Self::Swap => "swap",
            Self::List => "list",
            Self::Save => "save",
            Self::Add => "add",
            Self::Del => "del",
            Self::Test => "test",
            Self::Header => "header",
            Self::Type => "type",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
