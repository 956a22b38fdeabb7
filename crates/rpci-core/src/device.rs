//! PCI device records and slot selectors

use core::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// Downstream bus range decoded by a PCI-to-PCI bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BridgeInfo {
    /// Bus directly behind the bridge
    pub secondary_bus: u8,
    /// Highest bus reachable through the bridge
    pub subordinate_bus: u8,
}

/// A single PCI function as reported by an enumeration backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PciDevice {
    /// PCI domain (segment), usually 0
    pub domain: u32,
    /// Bus number
    pub bus: u8,
    /// Device (slot) number
    pub device: u8,
    /// Function number
    pub function: u8,
    /// Vendor ID
    pub vendor_id: u16,
    /// Device ID
    pub device_id: u16,
    /// Subsystem vendor ID
    pub subvendor_id: u16,
    /// Subsystem device ID
    pub subdevice_id: u16,
    /// 24-bit class code (class, subclass, prog-if)
    pub class: u32,
    /// Revision ID
    pub revision: u8,
    /// Bridge bus range, present only for bridges decoding a downstream bus
    pub bridge: Option<BridgeInfo>,
}

impl PciDevice {
    /// Full address in `dddd:bb:dd.f` form, matching the sysfs directory name
    pub fn bdf(&self) -> String {
        format!(
            "{:04x}:{:02x}:{:02x}.{}",
            self.domain, self.bus, self.device, self.function
        )
    }
}

impl fmt::Display for PciDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:04x}:{:04x}",
            self.bdf(),
            self.vendor_id,
            self.device_id
        )
    }
}

/// Device selector with per-field wildcards
///
/// `None` in a field matches anything. Built from strings of the forms
/// `dev`, `bus:dev`, `bus:dev.func` and `dom:bus:dev.func`, where each
/// component is a decimal or `0x`-prefixed hex number, or `x`/`*` for a
/// wildcard. E.g. `"5:x"` matches every device on bus 5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotMatch {
    /// Domain to match, or any
    pub domain: Option<u32>,
    /// Bus to match, or any
    pub bus: Option<u32>,
    /// Device to match, or any
    pub device: Option<u32>,
    /// Function to match, or any
    pub function: Option<u32>,
}

impl SlotMatch {
    /// Check whether a device satisfies every concrete field
    pub fn matches(&self, dev: &PciDevice) -> bool {
        fn ok(sel: Option<u32>, val: u32) -> bool {
            sel.map_or(true, |s| s == val)
        }

        ok(self.domain, dev.domain)
            && ok(self.bus, dev.bus as u32)
            && ok(self.device, dev.device as u32)
            && ok(self.function, dev.function as u32)
    }
}

impl FromStr for SlotMatch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let mut stack = Vec::new();

        for part in s.split([':', '.']) {
            if stack.len() == 4 {
                return Err(Error::InvalidSelector(s.to_string()));
            }
            match part {
                "x" | "*" => stack.push(None),
                _ => match parse_number(part) {
                    Some(v) => stack.push(Some(v)),
                    None => return Err(Error::InvalidSelector(s.to_string())),
                },
            }
        }

        if stack.is_empty() {
            return Err(Error::InvalidSelector(s.to_string()));
        }

        // Components bind from the right: the last one is the device
        // (or the function, once more than two are given).
        let mut m = SlotMatch::default();
        if stack.len() > 2 {
            m.function = stack.pop().unwrap_or(None);
        }
        m.device = stack.pop().unwrap_or(None);
        if let Some(v) = stack.pop() {
            m.bus = v;
        }
        if let Some(v) = stack.pop() {
            m.domain = v;
        }

        Ok(m)
    }
}

/// Parse a decimal or `0x`-prefixed hex number
pub(crate) fn parse_number(s: &str) -> Option<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(domain: u32, bus: u8, device: u8, function: u8) -> PciDevice {
        PciDevice {
            domain,
            bus,
            device,
            function,
            vendor_id: 0x8086,
            device_id: 0x10d3,
            subvendor_id: 0,
            subdevice_id: 0,
            class: 0x020000,
            revision: 0,
            bridge: None,
        }
    }

    #[test]
    fn test_bdf_format() {
        assert_eq!(dev(0, 0x1f, 2, 1).bdf(), "0000:1f:02.1");
    }

    #[test]
    fn test_selector_single_component_is_device() {
        let m: SlotMatch = "5".parse().unwrap();
        assert_eq!(m.device, Some(5));
        assert_eq!(m.bus, None);
        assert!(m.matches(&dev(0, 9, 5, 3)));
        assert!(!m.matches(&dev(0, 9, 4, 3)));
    }

    #[test]
    fn test_selector_bus_device() {
        let m: SlotMatch = "5:3".parse().unwrap();
        assert_eq!(m.bus, Some(5));
        assert_eq!(m.device, Some(3));
        assert_eq!(m.function, None);
    }

    #[test]
    fn test_selector_full_bdf() {
        let m: SlotMatch = "0:0x1f:2.1".parse().unwrap();
        assert_eq!(m.domain, Some(0));
        assert_eq!(m.bus, Some(0x1f));
        assert_eq!(m.device, Some(2));
        assert_eq!(m.function, Some(1));
        assert!(m.matches(&dev(0, 0x1f, 2, 1)));
        assert!(!m.matches(&dev(1, 0x1f, 2, 1)));
    }

    #[test]
    fn test_selector_wildcards() {
        let m: SlotMatch = "5:x".parse().unwrap();
        assert_eq!(m.bus, Some(5));
        assert_eq!(m.device, None);
        assert!(m.matches(&dev(0, 5, 31, 0)));
        assert!(!m.matches(&dev(0, 6, 31, 0)));

        let m: SlotMatch = "*:*:*.*".parse().unwrap();
        assert!(m.matches(&dev(3, 200, 7, 6)));
    }

    #[test]
    fn test_selector_rejects_garbage() {
        assert!("".parse::<SlotMatch>().is_err());
        assert!("foo".parse::<SlotMatch>().is_err());
        assert!("1:2:3.4.5".parse::<SlotMatch>().is_err());
        assert!("5::3".parse::<SlotMatch>().is_err());
    }

    #[test]
    fn test_device_serializes() {
        let json = serde_json::to_string(&dev(0, 1, 0, 0)).unwrap();
        assert!(json.contains("\"vendor_id\":32902"));
    }
}
