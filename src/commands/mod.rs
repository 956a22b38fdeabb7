//! CLI command implementations
//!
//! Every command works against the `PciBackend` trait, so the same code
//! serves the sysfs and dummy backends.

pub mod devlist;
pub mod getset;
pub mod reg;
pub mod tree;
