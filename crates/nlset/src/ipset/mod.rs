//! ipset requests, replies and sessions.

pub mod consts;
mod entry;
mod operation;
pub mod request;
pub mod response;
mod session;
mod types;

pub use entry::Entry;
pub use operation::{EntryCommand, Operation};
pub use request::Request;
pub use response::{DataMessage, Reply, ReplyKind};
pub use session::{ProtocolInfo, Response, Session, SessionConfig, TypeInfo};
pub use types::{Command, Family, Options, SetName};
