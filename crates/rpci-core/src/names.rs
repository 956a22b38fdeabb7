//! Vendor/device name database backed by a pci.ids flat file
//!
//! The file is the standard pciutils format: vendor lines at column
//! zero (`1234 Name`), device lines indented one tab, subsystem lines
//! indented two tabs (skipped), `#` comments. A missing database is not
//! an error; lookups then resolve to nothing and callers render empty
//! strings.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

const ENV_OVERRIDE: &str = "PCI_ID_DATABASE";

const DEFAULT_PATHS: &[&str] = &[
    "/usr/share/misc/pci.ids",
    "/usr/share/hwdata/pci.ids",
    "/usr/local/share/pciids/pci.ids",
];

struct VendorEntry {
    name: String,
    devices: HashMap<u16, String>,
}

/// In-memory vendor/device name map
pub struct NameDb {
    vendors: HashMap<u16, VendorEntry>,
}

impl NameDb {
    /// Empty database; every lookup misses
    pub fn empty() -> Self {
        Self {
            vendors: HashMap::new(),
        }
    }

    /// Load from an explicit path, the `PCI_ID_DATABASE` environment
    /// variable, or the first default location that exists. Degrades to
    /// an empty database with a warning when nothing is found.
    pub fn load(override_path: Option<&Path>) -> Self {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_OVERRIDE).map(PathBuf::from))
            .or_else(|| {
                DEFAULT_PATHS
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists())
            });

        let Some(path) = path else {
            log::warn!("no pci.ids database found, names will not resolve");
            return Self::empty();
        };

        match File::open(&path) {
            Ok(file) => match Self::from_reader(BufReader::new(file)) {
                Ok(db) => {
                    log::debug!("loaded {} vendors from {}", db.len(), path.display());
                    db
                }
                Err(e) => {
                    log::warn!("failed to read {}: {}", path.display(), e);
                    Self::empty()
                }
            },
            Err(e) => {
                log::warn!("can't open {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Parse the pci.ids format from any reader
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut vendors: HashMap<u16, VendorEntry> = HashMap::new();
        let mut current: Option<u16> = None;

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Subsystem lines are not decoded.
            if line.starts_with("\t\t") {
                continue;
            }

            if let Some(rest) = line.strip_prefix('\t') {
                let Some(vid) = current else {
                    log::warn!("device entry with no vendor at line {}", lineno + 1);
                    continue;
                };
                if let Some((did, name)) = split_id_line(rest) {
                    if did != 0 {
                        if let Some(vendor) = vendors.get_mut(&vid) {
                            vendor.devices.insert(did, name.to_string());
                        }
                    }
                }
            } else if let Some((vid, name)) = split_id_line(&line) {
                if vid != 0 {
                    vendors.insert(
                        vid,
                        VendorEntry {
                            name: name.to_string(),
                            devices: HashMap::new(),
                        },
                    );
                    current = Some(vid);
                }
            } else {
                // Device class sections and other non-vendor content;
                // stop attaching tab-indented lines to the last vendor.
                current = None;
            }
        }

        Ok(Self { vendors })
    }

    /// Number of vendors loaded
    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    /// True when no vendors are loaded
    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    /// Resolve a vendor ID to its name
    pub fn vendor_name(&self, vendor_id: u16) -> Option<&str> {
        self.vendors.get(&vendor_id).map(|v| v.name.as_str())
    }

    /// Resolve a (vendor, device) pair to the device name
    pub fn device_name(&self, vendor_id: u16, device_id: u16) -> Option<&str> {
        self.vendors
            .get(&vendor_id)?
            .devices
            .get(&device_id)
            .map(String::as_str)
    }
}

/// Split `"1234  Some Name"` into the hex ID and the trimmed name
fn split_id_line(s: &str) -> Option<(u16, &str)> {
    let (id, rest) = s.split_once(char::is_whitespace)?;
    let id = u16::from_str_radix(id, 16).ok()?;
    let name = rest.trim();
    if name.is_empty() {
        None
    } else {
        Some((id, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# comment line
8086  Intel Corporation
\t10d3  82574L Gigabit Network Connection
\t\t8086 0001  Some subsystem variant
\t2922  82801IR/IO/IH SATA AHCI Controller
10de  NVIDIA Corporation
0000  Bogus zero vendor
C 02  Network controller
\t00  Ethernet controller
";

    fn db() -> NameDb {
        NameDb::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_vendor_lookup() {
        assert_eq!(db().vendor_name(0x8086), Some("Intel Corporation"));
        assert_eq!(db().vendor_name(0x10de), Some("NVIDIA Corporation"));
        assert_eq!(db().vendor_name(0x1af4), None);
    }

    #[test]
    fn test_device_lookup() {
        let db = db();
        assert_eq!(
            db.device_name(0x8086, 0x10d3),
            Some("82574L Gigabit Network Connection")
        );
        assert_eq!(db.device_name(0x8086, 0xffff), None);
        assert_eq!(db.device_name(0x10de, 0x10d3), None);
    }

    #[test]
    fn test_subsystem_and_zero_ids_skipped() {
        let db = db();
        assert_eq!(db.vendor_name(0x0000), None);
        // The subsystem line must not appear as a device of 0x8086.
        assert_eq!(db.device_name(0x8086, 0x0001), None);
    }

    #[test]
    fn test_class_section_not_attached_to_last_vendor() {
        // The trailing "C 02" section resets the current vendor, so its
        // tab-indented lines don't pollute NVIDIA's device list.
        assert_eq!(db().device_name(0x10de, 0x0000), None);
    }

    #[test]
    fn test_empty_database() {
        let db = NameDb::empty();
        assert!(db.is_empty());
        assert_eq!(db.vendor_name(0x8086), None);
    }
}
