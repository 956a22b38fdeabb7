//! rpci-sysfs - PCI enumeration through the Linux sysfs interface
//!
//! Enumerates `/sys/bus/pci/devices`: one directory per function, named
//! `dddd:bb:dd.f`, with identity registers exposed as attribute files
//! and raw configuration space as the `config` file. Bridges carry
//! `secondary_bus_number`/`subordinate_bus_number` attributes, which is
//! how the backend attaches bridge info without touching config space.
//!
//! Config-space writes normally require root; reads beyond offset 0x40
//! may be truncated for unprivileged users on some kernels.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rpci_core::backend::{PciBackend, RegWidth};
use rpci_core::device::{BridgeInfo, PciDevice, SlotMatch};
use rpci_core::{Error, Result};

pub use error::SysfsError;

const DEFAULT_ROOT: &str = "/sys/bus/pci/devices";

/// PCI backend over the Linux sysfs device tree
#[derive(Debug)]
pub struct SysfsBackend {
    root: PathBuf,
}

impl SysfsBackend {
    /// Open the standard sysfs PCI tree
    pub fn new() -> error::Result<Self> {
        Self::with_root(PathBuf::from(DEFAULT_ROOT))
    }

    /// Open a PCI device tree at a non-standard location (tests)
    pub fn with_root(root: PathBuf) -> error::Result<Self> {
        if !root.is_dir() {
            return Err(SysfsError::NotAvailable { path: root });
        }
        Ok(Self { root })
    }

    fn scan(&self, filter: Option<&SlotMatch>) -> error::Result<Vec<PciDevice>> {
        let entries = fs::read_dir(&self.root).map_err(|source| SysfsError::Scan {
            path: self.root.clone(),
            source,
        })?;

        let mut devices = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|source| SysfsError::Scan {
                path: self.root.clone(),
                source,
            })?;

            let name = entry.file_name();
            let Some(dev) = parse_device(&entry.path(), &name.to_string_lossy()) else {
                log::debug!("skipping unparsable sysfs entry {:?}", name);
                continue;
            };

            if filter.map_or(true, |m| m.matches(&dev)) {
                devices.push(dev);
            }
        }

        // read_dir order is arbitrary; sort for stable output.
        devices.sort_by_key(|d| (d.domain, d.bus, d.device, d.function));

        log::debug!("enumerated {} devices", devices.len());
        Ok(devices)
    }

    fn config_path(&self, dev: &PciDevice) -> PathBuf {
        self.root.join(dev.bdf()).join("config")
    }
}

impl PciBackend for SysfsBackend {
    fn devices(&mut self, filter: Option<&SlotMatch>) -> Result<Vec<PciDevice>> {
        self.scan(filter)
            .map_err(|e| Error::Enumeration(Box::new(e)))
    }

    fn read_config(&mut self, dev: &PciDevice, offset: u32, width: RegWidth) -> Result<u32> {
        let wrap = |source: std::io::Error| Error::ConfigRead {
            bdf: dev.bdf(),
            offset,
            source: Box::new(source),
        };

        let mut file = File::open(self.config_path(dev)).map_err(wrap)?;
        file.seek(SeekFrom::Start(offset as u64)).map_err(wrap)?;

        let mut buf = [0u8; 4];
        let n = width.bytes() as usize;
        file.read_exact(&mut buf[..n]).map_err(wrap)?;

        Ok(match width {
            RegWidth::Byte => buf[0] as u32,
            RegWidth::Word => u16::from_le_bytes([buf[0], buf[1]]) as u32,
            RegWidth::Dword => u32::from_le_bytes(buf),
        })
    }

    fn write_config(
        &mut self,
        dev: &PciDevice,
        offset: u32,
        width: RegWidth,
        value: u32,
    ) -> Result<()> {
        let wrap = |source: std::io::Error| Error::ConfigWrite {
            bdf: dev.bdf(),
            offset,
            source: Box::new(source),
        };

        let mut file = OpenOptions::new()
            .write(true)
            .open(self.config_path(dev))
            .map_err(wrap)?;
        file.seek(SeekFrom::Start(offset as u64)).map_err(wrap)?;

        let bytes = value.to_le_bytes();
        let n = width.bytes() as usize;
        file.write_all(&bytes[..n]).map_err(wrap)?;

        Ok(())
    }
}

/// Parse one sysfs device directory into a device record
///
/// `name` is the directory name, `dddd:bb:dd.f`. Returns `None` for
/// entries that don't look like a PCI address or lack the mandatory
/// identity attributes.
fn parse_device(path: &Path, name: &str) -> Option<PciDevice> {
    let (domain, bus, device, function) = parse_bdf_name(name)?;

    let vendor_id = read_attr_u16(&path.join("vendor"))?;
    let device_id = read_attr_u16(&path.join("device"))?;

    let subvendor_id = read_attr_u16(&path.join("subsystem_vendor")).unwrap_or(0);
    let subdevice_id = read_attr_u16(&path.join("subsystem_device")).unwrap_or(0);
    let class = read_attr_u32(&path.join("class")).unwrap_or(0);
    let revision = read_attr_u8(&path.join("revision")).unwrap_or(0);

    // Only bridge functions expose the downstream bus attributes.
    let bridge = match (
        read_attr_u8(&path.join("secondary_bus_number")),
        read_attr_u8(&path.join("subordinate_bus_number")),
    ) {
        (Some(secondary_bus), Some(subordinate_bus)) => Some(BridgeInfo {
            secondary_bus,
            subordinate_bus,
        }),
        _ => None,
    };

    Some(PciDevice {
        domain,
        bus,
        device,
        function,
        vendor_id,
        device_id,
        subvendor_id,
        subdevice_id,
        class,
        revision,
        bridge,
    })
}

/// Parse a `dddd:bb:dd.f` directory name
fn parse_bdf_name(name: &str) -> Option<(u32, u8, u8, u8)> {
    let mut parts = name.split(':');
    let domain = u32::from_str_radix(parts.next()?, 16).ok()?;
    let bus = u8::from_str_radix(parts.next()?, 16).ok()?;

    let dev_func = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (device, function) = dev_func.split_once('.')?;
    let device = u8::from_str_radix(device, 16).ok()?;
    let function = u8::from_str_radix(function, 16).ok()?;

    Some((domain, bus, device, function))
}

/// Read a numeric attribute file, accepting `0x`-prefixed hex or
/// decimal (the kernel uses both depending on the attribute)
fn read_attr(path: &Path) -> Option<u32> {
    let content = fs::read_to_string(path).ok()?;
    let content = content.trim();
    match content.strip_prefix("0x").or_else(|| content.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => content.parse().ok(),
    }
}

fn read_attr_u8(path: &Path) -> Option<u8> {
    read_attr(path)?.try_into().ok()
}

fn read_attr_u16(path: &Path) -> Option<u16> {
    read_attr(path)?.try_into().ok()
}

fn read_attr_u32(path: &Path) -> Option<u32> {
    read_attr(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bdf_name() {
        assert_eq!(parse_bdf_name("0000:00:1f.3"), Some((0, 0, 0x1f, 3)));
        assert_eq!(parse_bdf_name("0001:a0:10.0"), Some((1, 0xa0, 0x10, 0)));
        assert_eq!(parse_bdf_name("0000:00"), None);
        assert_eq!(parse_bdf_name("0000:00:1f"), None);
        assert_eq!(parse_bdf_name("0000:00:1f.3.1"), None);
        assert_eq!(parse_bdf_name("junk"), None);
    }

    #[test]
    fn test_bdf_roundtrips_to_sysfs_name() {
        let (domain, bus, device, function) = parse_bdf_name("0000:03:00.1").unwrap();
        let dev = PciDevice {
            domain,
            bus,
            device,
            function,
            vendor_id: 0,
            device_id: 0,
            subvendor_id: 0,
            subdevice_id: 0,
            class: 0,
            revision: 0,
            bridge: None,
        };
        assert_eq!(dev.bdf(), "0000:03:00.1");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = SysfsBackend::with_root(PathBuf::from("/nonexistent/pci")).unwrap_err();
        assert!(matches!(err, SysfsError::NotAvailable { .. }));
    }
}
