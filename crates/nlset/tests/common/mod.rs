//! Common test utilities for integration tests.
//!
//! Provides `TestNamespace` for isolated network namespace testing
//! and helper macros for conditional test execution. ipset sets belong to
//! the network namespace, so every test starts from an empty set table.

use nlset::{Error, Result, Session};
use std::io;
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global counter for unique namespace names.
static NAMESPACE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate a unique namespace name for this test.
fn unique_ns_name(prefix: &str) -> String {
    let id = NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    format!("nlset-test-{}-{}-{}", prefix, pid, id)
}

fn command_error(what: String) -> Error {
    Error::Socket(io::Error::other(what))
}

/// A test network namespace with automatic cleanup.
///
/// # Example
///
/// ```ignore
/// let ns = TestNamespace::new("create")?;
/// let mut session = ns.session()?;
/// session.create_set("blocklist", Options::default())?;
/// ```
pub struct TestNamespace {
    name: String,
}

impl TestNamespace {
    /// Create a new test namespace with a unique name.
    pub fn new(prefix: &str) -> Result<Self> {
        let name = unique_ns_name(prefix);

        let status = Command::new("ip")
            .args(["netns", "add", &name])
            .status()?;

        if !status.success() {
            return Err(command_error(format!(
                "failed to create namespace: {}",
                name
            )));
        }

        Ok(Self { name })
    }

    /// Open an ipset session inside this namespace.
    pub fn session(&self) -> Result<Session> {
        Session::open_in_namespace_path(format!("/var/run/netns/{}", self.name))
    }
}

impl Drop for TestNamespace {
    fn drop(&mut self) {
        let _ = Command::new("ip")
            .args(["netns", "del", &self.name])
            .status();
    }
}

/// Check if running as root.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Check if the kernel answers the ipset handshake.
pub fn has_ipset() -> bool {
    !matches!(Session::open(), Err(Error::FamilyNotFound { .. }))
}

/// Skip the test if not running as root or the kernel lacks ipset.
///
/// Use this at the beginning of integration tests that need kernel access.
#[macro_export]
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("Skipping test: requires root");
            return Ok(());
        }
        if !crate::common::has_ipset() {
            eprintln!("Skipping test: ip_set module not available");
            return Ok(());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ns_name() {
        let name1 = unique_ns_name("test");
        let name2 = unique_ns_name("test");
        assert_ne!(name1, name2);
        assert!(name1.starts_with("nlset-test-test-"));
    }
}
