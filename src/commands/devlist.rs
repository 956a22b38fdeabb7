//! Flat device listing

use rpci_core::backend::PciBackend;
use rpci_core::class;
use rpci_core::device::SlotMatch;
use rpci_core::names::NameDb;
use rpci_core::output::Sink;
use rpci_core::Result;

/// List devices matching the selector, one line each
pub fn run(
    backend: &mut dyn PciBackend,
    sink: &mut dyn Sink,
    names: &NameDb,
    selector: Option<&SlotMatch>,
    numeric: bool,
) -> Result<()> {
    let devices = backend.devices(selector)?;

    sink.open_list("device");

    for dev in &devices {
        sink.open_instance("device");

        sink.field("bdf", &dev.bdf());
        sink.text(" ");

        if numeric {
            sink.field("vendorid", &format!("{:04x}", dev.vendor_id));
            sink.text(":");
            sink.field("deviceid", &format!("{:04x}", dev.device_id));
            sink.text(" ");
            sink.field("subvendorid", &format!("{:04x}", dev.subvendor_id));
            sink.text(":");
            sink.field("subdeviceid", &format!("{:04x}", dev.subdevice_id));
            sink.text(" ");
            sink.field("class", &format!("{:06x}", dev.class));
            sink.text("\n");
        } else {
            sink.field("classname", class::class_name(dev.class).unwrap_or(""));
            sink.text(": ");
            sink.field("vendorname", names.vendor_name(dev.vendor_id).unwrap_or(""));
            sink.text(" ");
            sink.field(
                "devname",
                names.device_name(dev.vendor_id, dev.device_id).unwrap_or(""),
            );
            sink.text("\n");
        }

        sink.close_instance("device");
    }

    sink.close_list("device");

    Ok(())
}
