//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "rpci")]
#[command(author, version, about = "PCI configuration space utility", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output rendering
    #[arg(long, value_enum, default_value_t = OutputMode::Text, global = true)]
    pub output: OutputMode,

    /// Enumeration backend [available: sysfs, dummy]
    #[arg(long, default_value = "sysfs", global = true)]
    pub backend: String,

    /// Path to a pci.ids file (overrides PCI_ID_DATABASE and the
    /// default search locations)
    #[arg(long, global = true)]
    pub id_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// How structured output is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List PCI devices
    Devlist {
        /// Print numeric IDs instead of resolved names
        #[arg(short = 'n', long = "number")]
        numeric: bool,

        /// Restrict to matching devices; [dom:]bus:dev[.func] with
        /// 'x' or '*' as wildcards, e.g. "5:x"
        #[arg(short, long)]
        selector: Option<String>,
    },

    /// Show the PCI bus hierarchy as a tree
    Tree {
        /// Print numeric IDs instead of resolved names
        #[arg(short = 'n', long = "number")]
        numeric: bool,
    },

    /// Read a configuration register from matching devices
    Get {
        /// Device selector, [dom:]bus:dev[.func]
        #[arg(short, long)]
        selector: String,

        /// Register offset: a number with optional .b/.h/.w width
        /// suffix, or a symbolic name (see `rpci reg`)
        offset: String,
    },

    /// Write a configuration register on matching devices
    Set {
        /// Device selector, [dom:]bus:dev[.func]
        #[arg(short, long)]
        selector: String,

        /// Register offset: a number with optional .b/.h/.w width
        /// suffix, or a symbolic name (see `rpci reg`)
        offset: String,

        /// Value to write (decimal or 0x hex)
        #[arg(value_parser = parse_hex_u32)]
        value: u32,
    },

    /// List the symbolic register names
    Reg,
}
