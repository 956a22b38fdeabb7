//! Backend registry
//!
//! Opens an enumeration backend by name and hands the rest of the CLI a
//! boxed `PciBackend`; nothing outside this module knows which concrete
//! backend is in use.

use rpci_core::backend::PciBackend;
use rpci_dummy::DummyBackend;
use rpci_sysfs::SysfsBackend;
use thiserror::Error;

const AVAILABLE: &str = "sysfs, dummy";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown backend '{name}' [available: {AVAILABLE}]")]
    Unknown { name: String },

    #[error("failed to open backend '{name}': {source}")]
    Init {
        name: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Open a backend by name
pub fn open_backend(name: &str) -> Result<Box<dyn PciBackend>, BackendError> {
    match name {
        "sysfs" => {
            let backend = SysfsBackend::new().map_err(|e| BackendError::Init {
                name: "sysfs",
                source: Box::new(e),
            })?;
            Ok(Box::new(backend))
        }
        "dummy" => Ok(Box::new(DummyBackend::sample())),
        other => Err(BackendError::Unknown {
            name: other.to_string(),
        }),
    }
}
