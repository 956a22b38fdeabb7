//! Error types for rpci-core

use thiserror::Error;

/// Errors surfaced by the core library and its backends
#[derive(Debug, Error)]
pub enum Error {
    /// Selector string could not be parsed
    #[error("invalid selector '{0}'")]
    InvalidSelector(String),

    /// Register offset string could not be parsed
    #[error("invalid register offset '{0}'")]
    InvalidOffset(String),

    /// Symbolic register name is not in the register table
    #[error("unrecognized register name '{0}'")]
    UnknownRegister(String),

    /// Device enumeration failed in the backend
    #[error("PCI enumeration failed")]
    Enumeration(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration space read failed
    #[error("config read at {bdf} offset {offset:#x} failed")]
    ConfigRead {
        bdf: String,
        offset: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration space write failed
    #[error("config write at {bdf} offset {offset:#x} failed")]
    ConfigWrite {
        bdf: String,
        offset: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using the core error
pub type Result<T> = std::result::Result<T, Error>;
