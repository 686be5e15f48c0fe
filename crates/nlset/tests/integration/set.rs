//! Set lifecycle tests.

use nlset::{Family, KernelError, Options, Result};

use crate::common::TestNamespace;

#[test]
fn test_create_and_destroy() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-create")?;
    let mut session = ns.session()?;

    session.create_set("blocklist", Options::default())?;
    session.destroy_set("blocklist")?;

    Ok(())
}

#[test]
fn test_create_is_idempotent() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-idem")?;
    let mut session = ns.session()?;

    session.create_set("blocklist", Options::default())?;
    session.create_set("blocklist", Options::default())?;

    session.destroy_set("blocklist")?;
    Ok(())
}

#[test]
fn test_create_excl_reports_exists() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-excl")?;
    let mut session = ns.session()?;

    session.create_set("blocklist", Options::default())?;

    let err = session
        .create_set(
            "blocklist",
            Options {
                excl: true,
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(err.is_already_exists(), "unexpected error: {err}");

    Ok(())
}

#[test]
fn test_destroy_missing_set() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-missing")?;
    let mut session = ns.session()?;

    let err = session.destroy_set("nosuchset").unwrap_err();
    assert_eq!(err.kernel_error(), Some(KernelError::NotFound));

    let err = session.flush_set("nosuchset").unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[test]
fn test_flush_empties_set() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-flush")?;
    let mut session = ns.session()?;
    let opts = Options::default();

    session.create_set("blocklist", opts)?;
    session.add_entry("blocklist", "10.0.0.0/8".parse()?, opts)?;
    session.add_entry("blocklist", "192.0.2.1".parse()?, opts)?;
    assert!(session.test_entry("blocklist", "10.1.2.3".parse()?, opts)?);

    session.flush_set("blocklist")?;

    assert!(!session.test_entry("blocklist", "10.1.2.3".parse()?, opts)?);
    assert!(!session.test_entry("blocklist", "192.0.2.1".parse()?, opts)?);

    // Flushed sets still exist.
    session.destroy_set("blocklist")?;
    Ok(())
}

#[test]
fn test_create_inet6_set() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-inet6")?;
    let mut session = ns.session()?;
    let opts = Options {
        ipv6: true,
        ..Default::default()
    };

    session.create_set("blocklist6", opts)?;
    session.add_entry("blocklist6", "2001:db8::/32".parse()?, opts)?;
    assert!(session.test_entry("blocklist6", "2001:db8::1".parse()?, opts)?);

    session.destroy_set("blocklist6")?;
    Ok(())
}

#[test]
fn test_create_with_timeout() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-timeout")?;
    let mut session = ns.session()?;

    session.create_set(
        "expiring",
        Options {
            timeout: 600,
            ..Default::default()
        },
    )?;
    session.add_entry(
        "expiring",
        "198.51.100.7".parse()?,
        Options {
            timeout: 30,
            ..Default::default()
        },
    )?;
    assert!(session.test_entry("expiring", "198.51.100.7".parse()?, Options::default())?);

    Ok(())
}

#[test]
fn test_type_revision() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-type")?;
    let mut session = ns.session()?;

    let info = session.type_revision("hash:net", Family::Inet)?;
    assert_eq!(info.typename, "hash:net");
    assert!(info.revision >= info.revision_min);

    let err = session
        .type_revision("hash:nonsense", Family::Inet)
        .unwrap_err();
    assert!(err.kernel_error().is_some());

    Ok(())
}

#[test]
fn test_invalid_name_is_rejected_locally() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("set-name")?;
    let mut session = ns.session()?;

    let err = session
        .create_set(&"x".repeat(40), Options::default())
        .unwrap_err();
    assert!(err.is_invalid_argument());

    // The session is still usable afterwards.
    session.create_set("ok", Options::default())?;
    Ok(())
}
