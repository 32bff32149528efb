use std::io;

use thiserror::Error;

/// Everything that can stop a translation run.
#[derive(Debug, Error)]
pub enum VmError {
    /// An input record that is not an integer in `[0, 2^20)`.
    #[error("malformed address {input:?}: {reason}")]
    MalformedAddress { input: String, reason: String },

    /// The page source could not be opened, or a page read came back short.
    #[error("backing store unavailable: {context}")]
    BackingStoreUnavailable {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The address stream itself could not be read.
    #[error("cannot read address input at line {line}")]
    InputUnreadable {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal bookkeeping disagreed with itself. Should never happen.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl VmError {
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        VmError::MalformedAddress {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn backing_store(context: impl Into<String>, source: io::Error) -> Self {
        VmError::BackingStoreUnavailable {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, VmError>;
