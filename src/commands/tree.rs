//! Bus hierarchy rendering

use rpci_core::backend::PciBackend;
use rpci_core::names::NameDb;
use rpci_core::output::Sink;
use rpci_core::topology::BusTree;
use rpci_core::Result;

/// Build the bus topology from a full enumeration and render it
pub fn run(
    backend: &mut dyn PciBackend,
    sink: &mut dyn Sink,
    names: &NameDb,
    numeric: bool,
) -> Result<()> {
    let devices = backend.devices(None)?;
    log::debug!("building topology over {} devices", devices.len());

    let tree = BusTree::build(&devices);
    tree.render(sink, names, !numeric);

    Ok(())
}
