//! Synchronous netlink client for the Linux ipset subsystem.
//!
//! `nlset` creates, destroys, flushes and populates `hash:net` ipsets by
//! talking to the kernel directly over a `NETLINK_NETFILTER` socket. Every
//! call is a blocking round trip; nothing is cached in userspace.
//!
//! # Features
//!
//! - `serde` - `Serialize` for [`ProtocolInfo`], [`TypeInfo`] and [`Family`]
//! - `integration` - root-only integration tests against the running kernel
//!
//! # Example
//!
//! ```ignore
//! use nlset::{Entry, Options, Session};
//!
//! fn main() -> nlset::Result<()> {
//!     let mut session = Session::open()?;
//!
//!     session.create_set("blocklist", Options::default())?;
//!     let entry: Entry = "203.0.113.0/24".parse()?;
//!     session.add_entry("blocklist", entry, Options { timeout: 3600, ..Default::default() })?;
//!
//!     if let Err(e) = session.create_set("blocklist", Options { excl: true, ..Default::default() }) {
//!         assert!(e.is_already_exists());
//!     }
//!
//!     session.destroy_set("blocklist")?;
//!     session.close()
//! }
//! ```

pub mod ipset;
pub mod netlink;

// Re-export common types at crate root for convenience
pub use ipset::{
    Command, Entry, EntryCommand, Family, Operation, Options, ProtocolInfo, Response, Session,
    SessionConfig, SetName, TypeInfo,
};
pub use netlink::{Error, KernelError, Result, Transport};
