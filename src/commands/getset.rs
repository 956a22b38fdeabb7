//! Configuration register get/set

use rpci_core::backend::PciBackend;
use rpci_core::device::SlotMatch;
use rpci_core::regs;
use rpci_core::Result;

/// Read a register from every device the selector matches
pub fn run_get(backend: &mut dyn PciBackend, selector: &str, offset: &str) -> Result<()> {
    let selector: SlotMatch = selector.parse()?;
    let (offset, width) = regs::parse_offset(offset)?;

    let devices = backend.devices(Some(&selector))?;
    for dev in &devices {
        let value = backend.read_config(dev, offset, width)?;
        println!(
            "get {} {:x} 0x{:0digits$x}",
            dev.bdf(),
            offset,
            value,
            digits = width.hex_digits()
        );
    }

    Ok(())
}

/// Write a register on every device the selector matches
pub fn run_set(
    backend: &mut dyn PciBackend,
    selector: &str,
    offset: &str,
    value: u32,
) -> Result<()> {
    let selector: SlotMatch = selector.parse()?;
    let (offset, width) = regs::parse_offset(offset)?;

    let devices = backend.devices(Some(&selector))?;
    for dev in &devices {
        backend.write_config(dev, offset, width, value)?;
        println!(
            "set {} {:x} 0x{:0digits$x}",
            dev.bdf(),
            offset,
            value,
            digits = width.hex_digits()
        );
    }

    Ok(())
}
