//! Entry add/delete/test tests.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use nlset::{Entry, EntryCommand, Error, KernelError, Options, Result};

use crate::common::TestNamespace;

fn excl() -> Options {
    Options {
        excl: true,
        ..Default::default()
    }
}

#[test]
fn test_add_then_delete() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("entry-sym")?;
    let mut session = ns.session()?;
    let opts = Options::default();
    let entry = Entry::from(Ipv4Addr::new(203, 0, 113, 7));

    session.create_set("blocklist", opts)?;
    assert!(!session.test_entry("blocklist", entry, opts)?);

    session.add_entry("blocklist", entry, opts)?;
    assert!(session.test_entry("blocklist", entry, opts)?);

    session.del_entry("blocklist", entry, opts)?;
    assert!(!session.test_entry("blocklist", entry, opts)?);

    Ok(())
}

#[test]
fn test_add_excl_reports_exists() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("entry-excl")?;
    let mut session = ns.session()?;
    let entry: Entry = "192.0.2.0/24".parse()?;

    session.create_set("blocklist", Options::default())?;
    session.add_entry("blocklist", entry, Options::default())?;

    // Non-exclusive re-add succeeds.
    session.add_entry("blocklist", entry, Options::default())?;

    let err = session.add_entry("blocklist", entry, excl()).unwrap_err();
    assert_eq!(err.kernel_error(), Some(KernelError::AlreadyExists));

    Ok(())
}

#[test]
fn test_delete_missing_entry() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("entry-missing")?;
    let mut session = ns.session()?;
    let entry: Entry = "198.51.100.1".parse()?;

    session.create_set("blocklist", Options::default())?;

    let err = session.del_entry("blocklist", entry, excl()).unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    Ok(())
}

#[test]
fn test_entry_in_missing_set() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("entry-noset")?;
    let mut session = ns.session()?;
    let entry: Entry = "198.51.100.1".parse()?;

    let err = session
        .add_entry("nosuchset", entry, Options::default())
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    Ok(())
}

#[test]
fn test_cidr_membership() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("entry-cidr")?;
    let mut session = ns.session()?;
    let opts = Options::default();

    session.create_set("nets", opts)?;
    session.add_entry("nets", "10.20.0.0/16".parse()?, opts)?;

    assert!(session.test_entry("nets", "10.20.30.40".parse()?, opts)?);
    assert!(!session.test_entry("nets", "10.21.0.1".parse()?, opts)?);

    Ok(())
}

#[test]
fn test_family_mismatch() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("entry-family")?;
    let mut session = ns.session()?;

    session.create_set("v4", Options::default())?;

    // inet6 entry into an inet set: the kernel rejects it.
    let err = session
        .add_entry("v4", Entry::from(Ipv6Addr::LOCALHOST), Options::default())
        .unwrap_err();
    assert!(err.is_invalid_argument(), "unexpected error: {err}");

    // ipv6 requested for an inet entry: rejected before sending.
    let err = session
        .add_entry(
            "v4",
            Entry::from(Ipv4Addr::LOCALHOST),
            Options {
                ipv6: true,
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::FamilyMismatch { .. }));

    Ok(())
}

#[test]
fn test_timeout_without_timeout_set() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("entry-timeout")?;
    let mut session = ns.session()?;

    session.create_set("plain", Options::default())?;

    let err = session
        .add_entry(
            "plain",
            "192.0.2.9".parse()?,
            Options {
                timeout: 10,
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(err.is_invalid_argument(), "unexpected error: {err}");

    Ok(())
}

#[test]
fn test_handle_entry() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("entry-handle")?;
    let mut session = ns.session()?;
    let opts = Options::default();
    let addr = IpAddr::V4(Ipv4Addr::new(10, 9, 0, 0));

    session.create_set("handled", opts)?;
    session.handle_entry(EntryCommand::Add, "handled", addr, Some(16), opts)?;
    assert!(session.test_entry("handled", "10.9.1.1".parse()?, opts)?);

    session.handle_entry(EntryCommand::Del, "handled", addr, Some(16), opts)?;
    assert!(!session.test_entry("handled", "10.9.1.1".parse()?, opts)?);

    let err = session
        .handle_entry(EntryCommand::Add, "handled", addr, Some(40), opts)
        .unwrap_err();
    assert!(err.is_invalid_argument());

    Ok(())
}
