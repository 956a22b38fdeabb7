//! Symbolic register table listing

use rpci_core::regs;

/// Print every known register name with its offset and width
pub fn run() {
    println!("{:>20} {:>6} {}", "Name", "Offset", "Width");
    for r in regs::REGISTERS {
        println!("{:>20} {:>#6x} {:>5}", r.name, r.offset, r.width.bytes());
    }
}
