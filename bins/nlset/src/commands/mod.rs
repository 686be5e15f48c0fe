//! Subcommand implementations.

pub mod entry;
pub mod info;
pub mod set;

use clap::Args;
use nlset::{Options, SetName};
use serde::Serialize;

/// Output settings shared by every subcommand.
pub struct Output {
    pub json: bool,
    pub pretty: bool,
}

impl Output {
    /// Print a value as JSON on stdout.
    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{}", text);
        Ok(())
    }
}

/// Flags that map onto per-call [`Options`].
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// Use the inet6 family.
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Timeout in seconds (0 disables).
    #[arg(long, default_value_t = 0, value_name = "SECONDS")]
    pub timeout: u32,

    /// Fail if the set or entry already exists.
    #[arg(short = 'x', long)]
    pub excl: bool,
}

impl From<SetOptions> for Options {
    fn from(opts: SetOptions) -> Self {
        Options {
            ipv6: opts.ipv6,
            timeout: opts.timeout,
            excl: opts.excl,
        }
    }
}

/// clap value parser for set names.
pub fn parse_set_name(s: &str) -> nlset::Result<SetName> {
    SetName::new(s)
}
