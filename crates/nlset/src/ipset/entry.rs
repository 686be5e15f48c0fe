//! Set entries: a single address or an address/prefix pair.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use super::types::Family;
use crate::netlink::{Error, Result};

/// A set entry.
///
/// The family comes from the typed address, never from the text it may have
/// been parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    addr: IpAddr,
    prefix: Option<u8>,
}

impl Entry {
    /// A single address.
    pub fn addr(addr: impl Into<IpAddr>) -> Self {
        Self {
            addr: addr.into(),
            prefix: None,
        }
    }

    /// An address with a prefix length.
    ///
    /// Fails if the prefix is longer than the address family allows.
    pub fn net(addr: impl Into<IpAddr>, prefix: u8) -> Result<Self> {
        let addr = addr.into();
        let max = Family::of(&addr).max_prefix();
        if prefix > max {
            return Err(Error::InvalidEntry {
                input: format!("{}/{}", addr, prefix),
                reason: format!("prefix length {} exceeds {}", prefix, max),
            });
        }
        Ok(Self {
            addr,
            prefix: Some(prefix),
        })
    }

    /// Build from an address and an optional prefix.
    pub fn new(addr: impl Into<IpAddr>, prefix: Option<u8>) -> Result<Self> {
        match prefix {
            Some(prefix) => Self::net(addr, prefix),
            None => Ok(Self::addr(addr)),
        }
    }

    /// The address.
    pub fn ip(&self) -> IpAddr {
        self.addr
    }

    /// The prefix length, if any.
    pub fn prefix(&self) -> Option<u8> {
        self.prefix
    }

    /// The entry's address family.
    pub fn family(&self) -> Family {
        Family::of(&self.addr)
    }
}

impl From<IpAddr> for Entry {
    fn from(addr: IpAddr) -> Self {
        Self::addr(addr)
    }
}

impl From<Ipv4Addr> for Entry {
    fn from(addr: Ipv4Addr) -> Self {
        Self::addr(addr)
    }
}

impl From<Ipv6Addr> for Entry {
    fn from(addr: Ipv6Addr) -> Self {
        Self::addr(addr)
    }
}

impl FromStr for Entry {
    type Err = Error;

    /// Parse `"1.1.1.1"`, `"192.168.1.0/24"` or `"2001:db8::/32"`.
    ///
    /// Input with a `/` is treated as CIDR and reports CIDR errors; input
    /// without one is treated as a bare address.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidEntry {
            input: s.to_string(),
            reason,
        };

        match s.split_once('/') {
            Some((addr, prefix)) => {
                let addr: IpAddr = addr
                    .parse()
                    .map_err(|_| invalid(format!("invalid network address {:?}", addr)))?;
                let prefix: u8 = prefix
                    .parse()
                    .map_err(|_| invalid(format!("invalid prefix length {:?}", prefix)))?;
                let max = Family::of(&addr).max_prefix();
                if prefix > max {
                    return Err(invalid(format!("prefix length {} exceeds {}", prefix, max)));
                }
                Ok(Self {
                    addr,
                    prefix: Some(prefix),
                })
            }
            None => s
                .parse::<IpAddr>()
                .map(Self::addr)
                .map_err(|_| invalid("invalid IP address".to_string())),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}/{}", self.addr, prefix),
            None => write!(f, "{}", self.addr),
        }
    }
}
