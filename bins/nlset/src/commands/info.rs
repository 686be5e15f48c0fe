//! Protocol and set type information.

use clap::Args;
use nlset::{Family, Session};
use serde_json::json;

use super::Output;

#[derive(Args)]
pub struct InfoCmd {
    /// Set type to query.
    #[arg(long = "type", default_value = "hash:net", value_name = "TYPE")]
    typename: String,

    /// Query the inet6 revision range.
    #[arg(short = '6', long)]
    ipv6: bool,
}

impl InfoCmd {
    pub fn run(self, session: &mut Session, out: &Output) -> anyhow::Result<()> {
        let family = if self.ipv6 { Family::Inet6 } else { Family::Inet };
        let protocol = session.protocol_info();
        let kind = session.type_revision(&self.typename, family)?;

        if out.json {
            return out.print_json(&json!({
                "protocol": protocol,
                "type": kind,
            }));
        }

        println!(
            "protocol {} (kernel supports {}..={})",
            protocol.protocol, protocol.kernel_protocol_min, protocol.kernel_protocol
        );
        println!(
            "type {} family {} revision {}..={}",
            kind.typename, kind.family, kind.revision_min, kind.revision
        );
        Ok(())
    }
}
