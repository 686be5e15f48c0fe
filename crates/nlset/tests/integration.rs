//! Integration test entry point.
//!
//! The actual tests are organized in the `integration/` directory. Each test
//! opens its session inside a throw-away network namespace.
//!
//! # Running Tests
//!
//! Integration tests require root privileges and the `integration` feature:
//!
//! ```bash
//! # Run all integration tests
//! sudo cargo test -p nlset --features integration --test integration
//!
//! # Run specific test module
//! sudo cargo test -p nlset --features integration --test integration entry
//!
//! # Run with output
//! sudo cargo test -p nlset --features integration --test integration -- --nocapture
//! ```
//!
//! # Test Organization
//!
//! - `set.rs` - Set creation, destruction and flushing
//! - `entry.rs` - Entry add, delete and membership tests
//! - `scenario.rs` - End-to-end blocklist walk-through

#[macro_use]
#[path = "common/mod.rs"]
mod common;

#[path = "integration/set.rs"]
mod set;

#[path = "integration/entry.rs"]
mod entry;

#[path = "integration/scenario.rs"]
mod scenario;
