//! Entry commands: add, del, test.

use clap::Args;
use nlset::{Entry, EntryCommand, Options, Session, SetName};
use serde_json::json;

use super::{Output, SetOptions, parse_set_name};

#[derive(Args)]
pub struct AddCmd {
    /// Set name.
    #[arg(value_parser = parse_set_name)]
    name: SetName,

    /// Address or network (e.g. 192.0.2.1, 10.0.0.0/8, 2001:db8::/32).
    entry: Entry,

    #[command(flatten)]
    opts: SetOptions,
}

impl AddCmd {
    pub fn run(self, session: &mut Session) -> anyhow::Result<()> {
        handle(session, EntryCommand::Add, &self.name, self.entry, self.opts.into())
    }
}

#[derive(Args)]
pub struct DelCmd {
    /// Set name.
    #[arg(value_parser = parse_set_name)]
    name: SetName,

    /// Address or network to remove.
    entry: Entry,

    /// Use the inet6 family.
    #[arg(short = '6', long)]
    ipv6: bool,

    /// Fail if the entry is not in the set.
    #[arg(short = 'x', long)]
    excl: bool,
}

impl DelCmd {
    pub fn run(self, session: &mut Session) -> anyhow::Result<()> {
        let opts = Options {
            ipv6: self.ipv6,
            excl: self.excl,
            ..Default::default()
        };
        handle(session, EntryCommand::Del, &self.name, self.entry, opts)
    }
}

fn handle(
    session: &mut Session,
    cmd: EntryCommand,
    name: &SetName,
    entry: Entry,
    opts: Options,
) -> anyhow::Result<()> {
    tracing::debug!(set = %name, %entry, ?cmd, "entry command");
    session.handle_entry(cmd, name.as_str(), entry.ip(), entry.prefix(), opts)?;
    Ok(())
}

#[derive(Args)]
pub struct TestCmd {
    /// Set name.
    #[arg(value_parser = parse_set_name)]
    name: SetName,

    /// Address or network to look up.
    entry: Entry,

    /// Use the inet6 family.
    #[arg(short = '6', long)]
    ipv6: bool,
}

impl TestCmd {
    /// Returns whether the entry is present.
    pub fn run(self, session: &mut Session, out: &Output) -> anyhow::Result<bool> {
        let opts = Options {
            ipv6: self.ipv6,
            ..Default::default()
        };
        let present = session.test_entry(self.name.as_str(), self.entry, opts)?;

        if out.json {
            out.print_json(&json!({
                "set": self.name.as_str(),
                "entry": self.entry.to_string(),
                "present": present,
            }))?;
        } else if present {
            println!("{} is in set {}.", self.entry, self.name);
        } else {
            println!("{} is NOT in set {}.", self.entry, self.name);
        }

        Ok(present)
    }
}
