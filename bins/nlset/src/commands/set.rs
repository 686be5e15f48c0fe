//! Set-level commands: create, destroy, flush.

use clap::Args;
use nlset::{Session, SetName};

use super::{SetOptions, parse_set_name};

#[derive(Args)]
pub struct CreateCmd {
    /// Set name.
    #[arg(value_parser = parse_set_name)]
    name: SetName,

    #[command(flatten)]
    opts: SetOptions,
}

impl CreateCmd {
    pub fn run(self, session: &mut Session) -> anyhow::Result<()> {
        session.create_set(self.name.as_str(), self.opts.into())?;
        Ok(())
    }
}

#[derive(Args)]
pub struct NameCmd {
    /// Set name.
    #[arg(value_parser = parse_set_name)]
    name: SetName,
}

impl NameCmd {
    pub fn destroy(self, session: &mut Session) -> anyhow::Result<()> {
        session.destroy_set(self.name.as_str())?;
        Ok(())
    }

    pub fn flush(self, session: &mut Session) -> anyhow::Result<()> {
        session.flush_set(self.name.as_str())?;
        Ok(())
    }
}
