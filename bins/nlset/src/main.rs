//! nlset command - manage hash:net ipsets over netlink.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nlset::Session;

use commands::Output;

#[derive(Parser)]
#[command(name = "nlset", version, about = "Manage hash:net ipsets")]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long, global = true)]
    pretty: bool,

    /// Run inside a network namespace (name under /var/run/netns or a path).
    #[arg(short = 'n', long, global = true, value_name = "NETNS")]
    netns: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a hash:net set.
    #[command(visible_alias = "n")]
    Create(commands::set::CreateCmd),

    /// Destroy a set.
    #[command(visible_alias = "x")]
    Destroy(commands::set::NameCmd),

    /// Remove every entry from a set.
    #[command(visible_alias = "f")]
    Flush(commands::set::NameCmd),

    /// Add an entry to a set.
    #[command(visible_alias = "a")]
    Add(commands::entry::AddCmd),

    /// Delete an entry from a set.
    #[command(visible_alias = "d")]
    Del(commands::entry::DelCmd),

    /// Test whether an entry is in a set (exit status 1 when absent).
    #[command(visible_alias = "t")]
    Test(commands::entry::TestCmd),

    /// Show negotiated protocol and set type information.
    Info(commands::info::InfoCmd),
}

fn open_session(netns: Option<&str>) -> nlset::Result<Session> {
    match netns {
        Some(ns) if ns.contains('/') => Session::open_in_namespace_path(ns),
        Some(ns) => Session::open_in_namespace_path(PathBuf::from("/var/run/netns").join(ns)),
        None => Session::open(),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let out = Output {
        json: cli.json,
        pretty: cli.pretty,
    };

    let mut session = match open_session(cli.netns.as_deref()) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Ok(false) means the command ran but reports a negative answer.
    let result = match cli.command {
        Command::Create(cmd) => cmd.run(&mut session).map(|()| true),
        Command::Destroy(cmd) => cmd.destroy(&mut session).map(|()| true),
        Command::Flush(cmd) => cmd.flush(&mut session).map(|()| true),
        Command::Add(cmd) => cmd.run(&mut session).map(|()| true),
        Command::Del(cmd) => cmd.run(&mut session).map(|()| true),
        Command::Test(cmd) => cmd.run(&mut session, &out),
        Command::Info(cmd) => cmd.run(&mut session, &out).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    session.close()?;
    Ok(())
}
