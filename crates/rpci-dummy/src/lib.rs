//! rpci-dummy - In-memory PCI backend for testing
//!
//! Serves a hand-built device list and emulates 256 bytes of
//! configuration space per function, so every rpci command can run
//! without hardware access. The identity registers are synthesized from
//! the device record; everything else starts at zero and is writable.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

use rpci_core::backend::{PciBackend, RegWidth};
use rpci_core::device::{BridgeInfo, PciDevice, SlotMatch};
use rpci_core::{Error, Result};

const CONFIG_SPACE: usize = 256;

/// In-memory PCI backend
///
/// Devices and their config spaces are stored side by side; lookup is
/// by exact BDF.
pub struct DummyBackend {
    devices: Vec<PciDevice>,
    config: Vec<[u8; CONFIG_SPACE]>,
}

impl DummyBackend {
    /// Empty backend with no devices
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            config: Vec::new(),
        }
    }

    /// A small but representative machine: host bridge, two root
    /// ports with devices behind them, and a few bus 0 endpoints
    pub fn sample() -> Self {
        let mut backend = Self::new();

        backend.push(device(0, 0, 0, 0x8086, 0x29c0, 0x060000, None));
        backend.push(device(0, 1, 0, 0x8086, 0x10d3, 0x020000, None));
        backend.push(device(0, 2, 0, 0x8086, 0x2922, 0x010601, None));
        backend.push(device(0, 0x1c, 0, 0x8086, 0x2940, 0x060400, Some((1, 1))));
        backend.push(device(0, 0x1c, 1, 0x8086, 0x2942, 0x060400, Some((2, 3))));
        backend.push(device(1, 0, 0, 0x10ec, 0x8168, 0x020000, None));
        backend.push(device(2, 0, 0, 0x104c, 0x8240, 0x060400, Some((3, 3))));
        backend.push(device(3, 0, 0, 0x1217, 0x7113, 0x0c0010, None));

        backend
    }

    /// Add a device, synthesizing its config space
    pub fn push(&mut self, dev: PciDevice) {
        let mut cfg = [0u8; CONFIG_SPACE];

        cfg[0..2].copy_from_slice(&dev.vendor_id.to_le_bytes());
        cfg[2..4].copy_from_slice(&dev.device_id.to_le_bytes());
        cfg[8] = dev.revision;
        cfg[9] = (dev.class & 0xff) as u8;
        cfg[10] = ((dev.class >> 8) & 0xff) as u8;
        cfg[11] = ((dev.class >> 16) & 0xff) as u8;

        if let Some(bridge) = dev.bridge {
            cfg[14] = 0x01; // type 1 header
            cfg[24] = dev.bus;
            cfg[25] = bridge.secondary_bus;
            cfg[26] = bridge.subordinate_bus;
        } else {
            cfg[44..46].copy_from_slice(&dev.subvendor_id.to_le_bytes());
            cfg[46..48].copy_from_slice(&dev.subdevice_id.to_le_bytes());
        }

        self.devices.push(dev);
        self.config.push(cfg);
    }

    fn index_of(&self, dev: &PciDevice) -> Result<usize> {
        self.devices
            .iter()
            .position(|d| {
                d.domain == dev.domain
                    && d.bus == dev.bus
                    && d.device == dev.device
                    && d.function == dev.function
            })
            .ok_or_else(|| {
                Error::Enumeration(format!("no such device {}", dev.bdf()).into())
            })
    }

    fn check_range(dev: &PciDevice, offset: u32, width: RegWidth, write: bool) -> Result<()> {
        if offset as usize + width.bytes() as usize <= CONFIG_SPACE {
            return Ok(());
        }
        let source = std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "offset beyond emulated config space",
        );
        Err(if write {
            Error::ConfigWrite {
                bdf: dev.bdf(),
                offset,
                source: Box::new(source),
            }
        } else {
            Error::ConfigRead {
                bdf: dev.bdf(),
                offset,
                source: Box::new(source),
            }
        })
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PciBackend for DummyBackend {
    fn devices(&mut self, filter: Option<&SlotMatch>) -> Result<Vec<PciDevice>> {
        let devices: Vec<PciDevice> = self
            .devices
            .iter()
            .filter(|d| filter.map_or(true, |m| m.matches(d)))
            .cloned()
            .collect();

        log::debug!("dummy backend served {} devices", devices.len());
        Ok(devices)
    }

    fn read_config(&mut self, dev: &PciDevice, offset: u32, width: RegWidth) -> Result<u32> {
        let idx = self.index_of(dev)?;
        Self::check_range(dev, offset, width, false)?;

        let cfg = &self.config[idx];
        let off = offset as usize;
        Ok(match width {
            RegWidth::Byte => cfg[off] as u32,
            RegWidth::Word => u16::from_le_bytes([cfg[off], cfg[off + 1]]) as u32,
            RegWidth::Dword => {
                u32::from_le_bytes([cfg[off], cfg[off + 1], cfg[off + 2], cfg[off + 3]])
            }
        })
    }

    fn write_config(
        &mut self,
        dev: &PciDevice,
        offset: u32,
        width: RegWidth,
        value: u32,
    ) -> Result<()> {
        let idx = self.index_of(dev)?;
        Self::check_range(dev, offset, width, true)?;

        let off = offset as usize;
        let n = width.bytes() as usize;
        self.config[idx][off..off + n].copy_from_slice(&value.to_le_bytes()[..n]);
        Ok(())
    }
}

/// Build a device record; `bridge` is `(secondary, subordinate)`
fn device(
    bus: u8,
    slot: u8,
    function: u8,
    vendor_id: u16,
    device_id: u16,
    class: u32,
    bridge: Option<(u8, u8)>,
) -> PciDevice {
    PciDevice {
        domain: 0,
        bus,
        device: slot,
        function,
        vendor_id,
        device_id,
        subvendor_id: if bridge.is_none() { vendor_id } else { 0 },
        subdevice_id: if bridge.is_none() { 0x0001 } else { 0 },
        class,
        revision: 0x02,
        bridge: bridge.map(|(secondary_bus, subordinate_bus)| BridgeInfo {
            secondary_bus,
            subordinate_bus,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_enumerates() {
        let mut backend = DummyBackend::sample();
        let devices = backend.devices(None).unwrap();
        assert_eq!(devices.len(), 8);
        assert!(devices.iter().any(|d| d.bridge.is_some()));
    }

    #[test]
    fn test_selector_filters() {
        let mut backend = DummyBackend::sample();
        let sel: SlotMatch = "0:0x1c.x".parse().unwrap();
        let devices = backend.devices(Some(&sel)).unwrap();
        assert_eq!(devices.len(), 2);
        assert!(devices.iter().all(|d| d.device == 0x1c));
    }

    #[test]
    fn test_identity_registers() {
        let mut backend = DummyBackend::sample();
        let dev = backend.devices(None).unwrap()[0].clone();

        let vendor = backend.read_config(&dev, 0, RegWidth::Word).unwrap();
        assert_eq!(vendor, dev.vendor_id as u32);

        let class_dev = backend.read_config(&dev, 10, RegWidth::Byte).unwrap();
        assert_eq!(class_dev, (dev.class >> 8) & 0xff);
    }

    #[test]
    fn test_bridge_registers() {
        let mut backend = DummyBackend::sample();
        let bridge = backend
            .devices(None)
            .unwrap()
            .into_iter()
            .find(|d| d.bridge.map_or(false, |b| b.secondary_bus == 2))
            .unwrap();

        let secondary = backend.read_config(&bridge, 25, RegWidth::Byte).unwrap();
        let subordinate = backend.read_config(&bridge, 26, RegWidth::Byte).unwrap();
        assert_eq!(secondary, 2);
        assert_eq!(subordinate, 3);
    }

    #[test]
    fn test_write_and_readback() {
        let mut backend = DummyBackend::sample();
        let dev = backend.devices(None).unwrap()[0].clone();

        backend
            .write_config(&dev, 4, RegWidth::Word, 0x0106)
            .unwrap();
        assert_eq!(
            backend.read_config(&dev, 4, RegWidth::Word).unwrap(),
            0x0106
        );
    }

    #[test]
    fn test_out_of_range_access() {
        let mut backend = DummyBackend::sample();
        let dev = backend.devices(None).unwrap()[0].clone();
        assert!(backend.read_config(&dev, 255, RegWidth::Dword).is_err());
        assert!(matches!(
            backend.write_config(&dev, 256, RegWidth::Byte, 0),
            Err(Error::ConfigWrite { .. })
        ));
    }
}
