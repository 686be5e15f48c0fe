//! Error types for ipset netlink operations.

use std::fmt;
use std::io;

use crate::ipset::consts::*;
use crate::ipset::{Command, Family};

/// Result type for ipset operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Set-semantics outcome of a kernel error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelError {
    /// The set or entry is already present.
    AlreadyExists,
    /// The set or entry does not exist.
    NotFound,
    /// The kernel rejected the request parameters.
    InvalidArgument,
    /// Any other errno, kept verbatim.
    Unknown(i32),
}

impl KernelError {
    /// Classify a positive errno returned for `command`.
    ///
    /// `IPSET_ERR_EXIST` is ambiguous on its own: the kernel reports it when
    /// an exclusive add hits a present entry and when an exclusive delete or
    /// a test misses one.
    pub fn classify(command: Command, errno: i32) -> Self {
        match errno {
            libc::EEXIST | IPSET_ERR_EXIST_SETNAME2 => Self::AlreadyExists,
            IPSET_ERR_EXIST => match command {
                Command::Create | Command::Add => Self::AlreadyExists,
                _ => Self::NotFound,
            },
            libc::ENOENT => Self::NotFound,
            libc::EINVAL
            | libc::ENAMETOOLONG
            | IPSET_ERR_PROTOCOL
            | IPSET_ERR_TYPE_MISMATCH
            | IPSET_ERR_INVALID_CIDR
            | IPSET_ERR_INVALID_NETMASK
            | IPSET_ERR_INVALID_FAMILY
            | IPSET_ERR_TIMEOUT
            | IPSET_ERR_IPADDR_IPV4
            | IPSET_ERR_IPADDR_IPV6 => Self::InvalidArgument,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => f.write_str("already exists"),
            Self::NotFound => f.write_str("not found"),
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::Unknown(code) => write!(f, "{}", describe_errno(*code)),
        }
    }
}

/// Human-readable text for kernel and ipset-specific error codes.
pub fn describe_errno(errno: i32) -> String {
    let text = match errno {
        IPSET_ERR_PROTOCOL => "kernel and userspace protocol versions differ",
        IPSET_ERR_FIND_TYPE => "set type not supported by the kernel",
        IPSET_ERR_MAX_SETS => "maximum number of sets reached",
        IPSET_ERR_BUSY => "set is referenced and cannot be destroyed",
        IPSET_ERR_EXIST_SETNAME2 => "second set already exists",
        IPSET_ERR_TYPE_MISMATCH => "set type does not match",
        IPSET_ERR_EXIST => "element or set already added or missing",
        IPSET_ERR_INVALID_CIDR => "invalid CIDR prefix",
        IPSET_ERR_INVALID_NETMASK => "invalid netmask",
        IPSET_ERR_INVALID_FAMILY => "invalid address family",
        IPSET_ERR_TIMEOUT => "timeout support not enabled on the set",
        IPSET_ERR_REFERENCED => "set is referenced",
        IPSET_ERR_IPADDR_IPV4 => "invalid IPv4 address",
        IPSET_ERR_IPADDR_IPV6 => "invalid IPv6 address",
        _ => return io::Error::from_raw_os_error(errno).to_string(),
    };
    text.to_string()
}

/// Errors that can occur during ipset operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("socket error: {0}")]
    Socket(#[from] io::Error),

    /// The kernel does not expose the ipset subsystem.
    #[error("ipset subsystem not available (errno {errno}): is the ip_set module loaded?")]
    FamilyNotFound {
        /// The errno returned by the handshake.
        errno: i32,
    },

    /// No protocol version is supported by both sides.
    #[error(
        "kernel ipset protocol {} is not supported (supported: {}..={})",
        .kernel.map_or_else(|| "version".to_string(), |k| k.to_string()),
        IPSET_PROTOCOL_MIN,
        IPSET_PROTOCOL
    )]
    UnsupportedProtocol {
        /// Protocol version advertised by the kernel, if it answered at all.
        kernel: Option<u8>,
    },

    /// Attribute could not be encoded or decoded.
    #[error("malformed attribute: {0}")]
    MalformedAttribute(String),

    /// Reply framing is invalid.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// Too many replies did not belong to the pending request.
    #[error("protocol desync: expected sequence {expected}, got {actual}")]
    ProtocolDesync {
        /// Sequence number of the pending request.
        expected: u32,
        /// Sequence number of the last reply seen.
        actual: u32,
    },

    /// Kernel rejected the request.
    #[error("{command}: {kind} (errno {errno})")]
    Kernel {
        /// The command that failed.
        command: Command,
        /// Set-semantics classification.
        kind: KernelError,
        /// The positive errno value from the kernel.
        errno: i32,
    },

    /// Set name rejected before encoding.
    #[error("invalid set name {name:?}: {reason}")]
    InvalidSetName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Entry text could not be parsed or is out of range.
    #[error("invalid entry {input:?}: {reason}")]
    InvalidEntry {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Entry family disagrees with the requested family.
    #[error("{entry} entry cannot be used with an {requested} request")]
    FamilyMismatch {
        /// Family of the entry.
        entry: Family,
        /// Family selected by the options.
        requested: Family,
    },

    /// Operation and arguments do not fit together.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// `receive` was called with no request outstanding.
    #[error("no request is pending")]
    NoPendingRequest,
}

impl Error {
    /// Create a kernel error from a positive errno for the given command.
    pub fn kernel(command: Command, errno: i32) -> Self {
        Self::Kernel {
            command,
            kind: KernelError::classify(command, errno),
            errno,
        }
    }

    /// Get the kernel classification if this is a kernel error.
    pub fn kernel_error(&self) -> Option<KernelError> {
        match self {
            Self::Kernel { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Check if the set or entry already exists.
    pub fn is_already_exists(&self) -> bool {
        self.kernel_error() == Some(KernelError::AlreadyExists)
    }

    /// Check if the set or entry does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kernel_error() == Some(KernelError::NotFound)
    }

    /// Check if the request was rejected as invalid, by the kernel or before
    /// it was sent.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Self::Kernel { kind, .. } => *kind == KernelError::InvalidArgument,
            Self::InvalidSetName { .. }
            | Self::InvalidEntry { .. }
            | Self::FamilyMismatch { .. } => true,
            _ => false,
        }
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } | Self::FamilyNotFound { errno } => Some(*errno),
            Self::Socket(e) => e.raw_os_error(),
            _ => None,
        }
    }
}
