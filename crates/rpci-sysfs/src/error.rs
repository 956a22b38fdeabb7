//! Error types for sysfs PCI access

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Sysfs specific errors
#[derive(Debug, Error)]
pub enum SysfsError {
    /// The PCI sysfs tree does not exist on this system
    #[error("PCI sysfs tree not found at {path}")]
    NotAvailable {
        /// Path that was probed
        path: PathBuf,
    },

    /// Reading the device directory failed
    #[error("failed to scan {path}: {source}")]
    Scan {
        /// Directory being scanned
        path: PathBuf,
        #[source]
        source: io::Error,
    },

}

/// Result type for sysfs operations
pub type Result<T> = std::result::Result<T, SysfsError>;
