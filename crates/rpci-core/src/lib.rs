//! rpci-core - PCI enumeration, topology discovery and rendering
//!
//! This crate holds everything the `rpci` CLI needs that is not tied to
//! a particular access mechanism: the device model and slot selectors,
//! the single-pass bus topology builder with its depth-first renderer,
//! the structured-output sinks (text and JSON), the pci.ids name
//! database, the built-in class-code table, and the symbolic register
//! table.
//!
//! Hardware access is behind the [`backend::PciBackend`] trait;
//! concrete implementations live in `rpci-sysfs` (Linux) and
//! `rpci-dummy` (in-memory, for tests).
//!
//! # Example
//!
//! ```ignore
//! use rpci_core::{names::NameDb, output::TextSink, topology::BusTree};
//!
//! fn show_tree(backend: &mut dyn rpci_core::backend::PciBackend) -> rpci_core::Result<()> {
//!     let devices = backend.devices(None)?;
//!     let tree = BusTree::build(&devices);
//!     let mut sink = TextSink::new(std::io::stdout());
//!     tree.render(&mut sink, &NameDb::load(None), true);
//!     sink.finish()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod backend;
pub mod class;
pub mod device;
pub mod error;
pub mod names;
pub mod output;
pub mod regs;
pub mod topology;

pub use error::{Error, Result};
