//! Command dispatch and the typed set/entry facade.

use std::fmt;
use std::net::IpAddr;

use super::consts::*;
use super::entry::Entry;
use super::request::Request;
use super::session::Session;
use super::types::{Command, Family, Options, SetName};
use crate::netlink::message::{NLM_F_ACK, NLM_F_CREATE, NLM_F_EXCL, NLM_F_REQUEST};
use crate::netlink::{Error, Result, Transport};

/// Logical ipset operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a `hash:net` set.
    CreateSet,
    /// Destroy a set.
    DestroySet,
    /// Remove every entry of a set.
    FlushSet,
    /// Add an entry to a set.
    AddEntry,
    /// Remove an entry from a set.
    DeleteEntry,
    /// Check whether an entry is a member of a set.
    TestEntry,
}

impl Operation {
    /// Kernel command for this operation.
    pub fn command(self) -> Command {
        match self {
            Self::CreateSet => Command::Create,
            Self::DestroySet => Command::Destroy,
            Self::FlushSet => Command::Flush,
            Self::AddEntry => Command::Add,
            Self::DeleteEntry => Command::Del,
            Self::TestEntry => Command::Test,
        }
    }

    /// Whether the operation acts on an entry rather than a whole set.
    pub fn takes_entry(self) -> bool {
        matches!(self, Self::AddEntry | Self::DeleteEntry | Self::TestEntry)
    }

    /// Netlink flags for this operation.
    ///
    /// Every request asks for an ack. Create and add also carry
    /// `NLM_F_CREATE`; create, add and delete carry `NLM_F_EXCL` when
    /// `opts.excl` is set.
    pub fn flags(self, opts: &Options) -> u16 {
        let mut flags = NLM_F_REQUEST | NLM_F_ACK;
        match self {
            Self::CreateSet | Self::AddEntry => {
                flags |= NLM_F_CREATE;
                if opts.excl {
                    flags |= NLM_F_EXCL;
                }
            }
            Self::DeleteEntry => {
                if opts.excl {
                    flags |= NLM_F_EXCL;
                }
            }
            Self::DestroySet | Self::FlushSet | Self::TestEntry => {}
        }
        flags
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateSet => "create set",
            Self::DestroySet => "destroy set",
            Self::FlushSet => "flush set",
            Self::AddEntry => "add entry",
            Self::DeleteEntry => "delete entry",
            Self::TestEntry => "test entry",
        };
        f.write_str(name)
    }
}

/// Entry commands accepted by [`Session::handle_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryCommand {
    /// Add the entry.
    Add,
    /// Delete the entry.
    Del,
}

impl From<EntryCommand> for Operation {
    fn from(cmd: EntryCommand) -> Self {
        match cmd {
            EntryCommand::Add => Self::AddEntry,
            EntryCommand::Del => Self::DeleteEntry,
        }
    }
}

/// Reject requests the kernel should never see.
fn validate(op: Operation, entry: Option<&Entry>, opts: &Options) -> Result<()> {
    match (op.takes_entry(), entry) {
        (true, None) => {
            return Err(Error::InvalidRequest(format!("{} requires an entry", op)));
        }
        (false, Some(entry)) => {
            return Err(Error::InvalidRequest(format!(
                "{} does not take an entry (got {})",
                op, entry
            )));
        }
        _ => {}
    }

    if let Some(entry) = entry
        && opts.ipv6
        && entry.family() == Family::Inet
    {
        return Err(Error::FamilyMismatch {
            entry: entry.family(),
            requested: opts.family(),
        });
    }

    Ok(())
}

impl<T: Transport> Session<T> {
    /// Run one operation against the kernel.
    ///
    /// `CreateSet` first asks the kernel for the newest `hash:net` revision
    /// it supports for the requested family.
    pub fn execute(
        &mut self,
        op: Operation,
        name: &SetName,
        entry: Option<&Entry>,
        opts: Options,
    ) -> Result<()> {
        validate(op, entry, &opts)?;

        let flags = op.flags(&opts);
        let protocol = self.protocol();
        let request = match (op, entry) {
            (Operation::CreateSet, _) => {
                let family = opts.family();
                let revision = self.type_revision(SET_TYPE_HASH_NET, family)?.revision;
                Request::create(protocol, name, revision, family, opts.timeout, flags)
            }
            (Operation::AddEntry, Some(entry)) => {
                Request::entry(op.command(), protocol, name, entry, opts.timeout, flags)
            }
            (_, Some(entry)) => Request::entry(op.command(), protocol, name, entry, 0, flags),
            (_, None) => Request::set(op.command(), protocol, name, flags),
        };

        tracing::debug!(
            operation = %op,
            set = %name,
            entry = ?entry,
            "executing ipset operation"
        );
        self.request(&request)?;
        Ok(())
    }

    /// Create a `hash:net` set.
    ///
    /// Without `excl`, creating a set that already exists with the same
    /// parameters succeeds.
    pub fn create_set(&mut self, name: &str, opts: Options) -> Result<()> {
        self.execute(Operation::CreateSet, &SetName::new(name)?, None, opts)
    }

    /// Destroy a set.
    pub fn destroy_set(&mut self, name: &str) -> Result<()> {
        self.execute(
            Operation::DestroySet,
            &SetName::new(name)?,
            None,
            Options::default(),
        )
    }

    /// Remove every entry of a set.
    pub fn flush_set(&mut self, name: &str) -> Result<()> {
        self.execute(
            Operation::FlushSet,
            &SetName::new(name)?,
            None,
            Options::default(),
        )
    }

    /// Add an entry. `opts.timeout` sets its expiry.
    pub fn add_entry(&mut self, name: &str, entry: Entry, opts: Options) -> Result<()> {
        self.execute(Operation::AddEntry, &SetName::new(name)?, Some(&entry), opts)
    }

    /// Delete an entry. With `opts.excl`, a missing entry is `NotFound`.
    pub fn del_entry(&mut self, name: &str, entry: Entry, opts: Options) -> Result<()> {
        self.execute(
            Operation::DeleteEntry,
            &SetName::new(name)?,
            Some(&entry),
            opts,
        )
    }

    /// Check whether an entry is a member of a set.
    pub fn test_entry(&mut self, name: &str, entry: Entry, opts: Options) -> Result<bool> {
        match self.execute(Operation::TestEntry, &SetName::new(name)?, Some(&entry), opts) {
            Ok(()) => Ok(true),
            Err(Error::Kernel { errno, .. }) if errno == IPSET_ERR_EXIST => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Add or delete an address or `address/prefix` entry.
    pub fn handle_entry(
        &mut self,
        cmd: EntryCommand,
        name: &str,
        addr: IpAddr,
        prefix: Option<u8>,
        opts: Options,
    ) -> Result<()> {
        let entry = Entry::new(addr, prefix)?;
        self.execute(cmd.into(), &SetName::new(name)?, Some(&entry), opts)
    }
}
