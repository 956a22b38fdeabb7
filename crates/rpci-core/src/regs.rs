//! Symbolic configuration register names and offset parsing

use crate::backend::RegWidth;
use crate::device::parse_number;
use crate::error::{Error, Result};

/// A named configuration register
pub struct RegName {
    /// Symbolic name, as accepted by `get`/`set`
    pub name: &'static str,
    /// Byte offset in configuration space
    pub offset: u32,
    /// Natural access width
    pub width: RegWidth,
}

const fn reg(name: &'static str, offset: u32, width: RegWidth) -> RegName {
    RegName {
        name,
        offset,
        width,
    }
}

use RegWidth::{Byte, Dword, Word};

/// Registers of the type 0/1 common header, then the type-specific ones
pub static REGISTERS: &[RegName] = &[
    // Type 0/1 common configuration space
    reg("VENDOR", 0, Word),
    reg("DEVICE", 2, Word),
    reg("COMMAND", 4, Word),
    reg("STATUS", 6, Word),
    reg("REVISION", 8, Byte),
    reg("CLASS_PROG", 9, Byte),
    reg("CLASS_DEV", 10, Byte),
    reg("CACHE_LINE", 12, Byte),
    reg("PRIMARY_LATENCY", 13, Byte),
    reg("HEADER_TYPE", 14, Byte),
    reg("BIST", 15, Byte),
    // BARs 0/1 and the expansion ROM are shared between header types
    reg("BAR_0", 16, Dword),
    reg("BAR_1", 20, Dword),
    reg("EROM_BAR", 48, Dword),
    reg("CAPABILITIES", 52, Byte),
    reg("INTERRUPT_LINE", 56, Byte),
    reg("INTERRUPT_PIN", 57, Byte),
    // Type 0 configuration space
    reg("BAR_2", 24, Dword),
    reg("BAR_3", 28, Dword),
    reg("BAR_4", 32, Dword),
    reg("BAR_5", 36, Dword),
    reg("CARDBUS_CIS", 40, Dword),
    reg("SUBSYSTEM_VENDOR", 44, Word),
    reg("SUBSYSTEM_DEVICE", 46, Word),
    reg("MIN_GNT", 58, Byte),
    reg("MAX_LAT", 59, Byte),
    // Type 1 configuration space
    reg("PRIMARY_BUS", 24, Byte),
    reg("SECONDARY_BUS", 25, Byte),
    reg("SUBORDINATE_BUS", 26, Byte),
    reg("SECONDARY_LATENCY", 27, Byte),
    reg("IO_BASE", 28, Byte),
    reg("IO_LIMIT", 29, Byte),
    reg("SECONDARY_STATUS", 30, Word),
    reg("MEM_BASE", 32, Word),
    reg("MEM_LIMIT", 34, Word),
    reg("PREFETCH_BASE", 36, Word),
    reg("PREFETCH_LIMIT", 38, Word),
    reg("PREFETCH_BASE_UPPER", 40, Dword),
    reg("PREFETCH_LIMIT_UPPER", 44, Dword),
    reg("IO_BASE_UPPER", 48, Word),
    reg("IO_LIMIT_UPPER", 50, Word),
    reg("BRIDGE_CONTROL", 58, Word),
];

/// Look up a register by its symbolic name
pub fn lookup(name: &str) -> Option<&'static RegName> {
    REGISTERS.iter().find(|r| r.name == name)
}

/// Parse a register offset argument
///
/// Accepts a number (decimal or `0x` hex) with an optional width
/// suffix `.b`/`.h`/`.w` (default dword), or a symbolic name whose
/// width comes from the register table.
pub fn parse_offset(s: &str) -> Result<(u32, RegWidth)> {
    if s.is_empty() {
        return Err(Error::InvalidOffset(s.to_string()));
    }

    if s.starts_with(|c: char| c.is_ascii_digit()) {
        let (num, suffix) = match s.split_once('.') {
            Some((num, suffix)) => (num, Some(suffix)),
            None => (s, None),
        };

        let offset = parse_number(num).ok_or_else(|| Error::InvalidOffset(s.to_string()))?;
        let width = match suffix {
            Some("b") => Byte,
            Some("h") => Word,
            _ => Dword,
        };

        return Ok((offset, width));
    }

    match lookup(s) {
        Some(r) => Ok((r.offset, r.width)),
        None => Err(Error::UnknownRegister(s.to_string())),
    }
}
