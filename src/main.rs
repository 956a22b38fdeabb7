//! rpci - a PCI configuration space utility
//!
//! Enumerates PCI devices, renders a flat listing (`devlist`) or the
//! bus hierarchy (`tree`) as text or JSON, and reads/writes individual
//! configuration registers (`get`/`set`).
//!
//! # Architecture
//!
//! Commands only speak to the `PciBackend` trait from `rpci-core`. The
//! default backend walks the Linux sysfs tree (`rpci-sysfs`); an
//! in-memory backend (`rpci-dummy`) serves a canned machine for testing
//! and development. Human-readable names come from a pci.ids database
//! plus a built-in class-code table; machine output is produced by the
//! same rendering code through a JSON sink.

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, OutputMode};
use rpci_core::device::SlotMatch;
use rpci_core::names::NameDb;
use rpci_core::output::{JsonSink, Sink, TextSink};
use std::io;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let mut backend = backends::open_backend(&cli.backend)?;

    match cli.command {
        Commands::Devlist { numeric, ref selector } => {
            let selector: Option<SlotMatch> =
                selector.as_deref().map(str::parse).transpose()?;
            let names = load_names(&cli, numeric);
            let mut sink = make_sink(cli.output);
            commands::devlist::run(
                backend.as_mut(),
                sink.as_mut(),
                &names,
                selector.as_ref(),
                numeric,
            )?;
            sink.finish()?;
        }
        Commands::Tree { numeric } => {
            let names = load_names(&cli, numeric);
            let mut sink = make_sink(cli.output);
            commands::tree::run(backend.as_mut(), sink.as_mut(), &names, numeric)?;
            sink.finish()?;
        }
        Commands::Get { selector, offset } => {
            commands::getset::run_get(backend.as_mut(), &selector, &offset)?;
        }
        Commands::Set {
            selector,
            offset,
            value,
        } => {
            commands::getset::run_set(backend.as_mut(), &selector, &offset, value)?;
        }
        Commands::Reg => commands::reg::run(),
    }

    Ok(())
}

fn make_sink(mode: OutputMode) -> Box<dyn Sink> {
    match mode {
        OutputMode::Text => Box::new(TextSink::new(io::stdout())),
        OutputMode::Json => Box::new(JsonSink::new(io::stdout())),
    }
}

/// Load the name database unless numeric output makes it pointless
fn load_names(cli: &Cli, numeric: bool) -> NameDb {
    if numeric {
        NameDb::empty()
    } else {
        let names = NameDb::load(cli.id_db.as_deref());
        log::debug!("name database has {} vendors", names.len());
        names
    }
}
