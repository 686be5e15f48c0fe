//! End-to-end blocklist walk-through.

use std::net::{IpAddr, Ipv4Addr};

use nlset::{EntryCommand, KernelError, Options, Result};

use crate::common::TestNamespace;

#[test]
fn test_blocklist_lifecycle() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("scenario")?;
    let mut session = ns.session()?;
    let addr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
    let opts = Options::default();

    session.create_set("blocklist", opts)?;
    session.handle_entry(EntryCommand::Add, "blocklist", addr, None, opts)?;

    let err = session
        .handle_entry(
            EntryCommand::Add,
            "blocklist",
            addr,
            None,
            Options {
                excl: true,
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kernel_error(), Some(KernelError::AlreadyExists));

    session.handle_entry(EntryCommand::Del, "blocklist", addr, None, opts)?;
    session.destroy_set("blocklist")?;

    let err = session.destroy_set("blocklist").unwrap_err();
    assert_eq!(err.kernel_error(), Some(KernelError::NotFound));

    session.close()
}

#[test]
fn test_sessions_are_independent() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("scenario-two")?;
    let mut first = ns.session()?;
    let mut second = ns.session()?;

    assert_ne!(first.port_id(), second.port_id());
    assert_eq!(first.protocol(), second.protocol());

    first.create_set("shared", Options::default())?;
    second.add_entry("shared", "192.0.2.44".parse()?, Options::default())?;
    assert!(first.test_entry("shared", "192.0.2.44".parse()?, Options::default())?);

    Ok(())
}
