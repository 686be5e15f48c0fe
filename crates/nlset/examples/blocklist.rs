//! Maintain a small blocklist set.
//!
//! This example creates a `hash:net` set, adds the given addresses
//! (with an optional timeout), checks membership and tears the set down.
//!
//! Run with (requires root):
//!   sudo cargo run -p nlset --example blocklist -- 203.0.113.7 198.51.100.0/24
//!
//! Keep the set afterwards:
//!   sudo cargo run -p nlset --example blocklist -- --keep 203.0.113.7

use std::env;

use nlset::{Entry, Options, Session};

const SET: &str = "example-blocklist";

fn main() -> nlset::Result<()> {
    let mut keep = false;
    let mut entries = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--keep" {
            keep = true;
        } else {
            entries.push(arg.parse::<Entry>()?);
        }
    }

    if entries.is_empty() {
        entries.push("203.0.113.7".parse()?);
    }

    let mut session = Session::open()?;
    let info = session.protocol_info();
    println!(
        "ipset protocol {} (kernel {}..={})",
        info.protocol, info.kernel_protocol_min, info.kernel_protocol
    );

    // Timeouts require a set created with timeout support.
    session.create_set(
        SET,
        Options {
            timeout: 3600,
            ..Default::default()
        },
    )?;

    for entry in &entries {
        let opts = Options {
            timeout: 600,
            ..Default::default()
        };
        match session.add_entry(SET, *entry, Options { excl: true, ..opts }) {
            Ok(()) => println!("added {}", entry),
            Err(e) if e.is_already_exists() => println!("{} already listed", entry),
            Err(e) => return Err(e),
        }
    }

    for entry in &entries {
        let present = session.test_entry(SET, Entry::addr(entry.ip()), Options::default())?;
        println!("{:<24} {}", entry, if present { "blocked" } else { "absent" });
    }

    if !keep {
        session.destroy_set(SET)?;
        println!("destroyed {}", SET);
    }

    session.close()
}
