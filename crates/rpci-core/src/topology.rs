//! PCI topology discovery and tree rendering
//!
//! A flat, arbitrarily-ordered device enumeration is folded into a
//! registry of bus nodes in a single pass, then rendered depth-first
//! from the host-bus roots. The registry stores no child pointers:
//! parent→child edges are re-derived at render time from each bridge
//! device's own secondary bus number.

use crate::class;
use crate::device::PciDevice;
use crate::names::NameDb;
use crate::output::Sink;

/// One bus in the registry
///
/// `parent` is the bridge whose secondary bus equals `number`; it is
/// used for labeling only and never drives traversal. The device list
/// preserves discovery order.
pub struct BusNode<'a> {
    /// Bus number, unique within the registry
    pub number: u8,
    /// Bridge that claimed this bus as its secondary, if any
    pub parent: Option<&'a PciDevice>,
    /// Devices attached to this bus, in discovery order
    pub devices: Vec<&'a PciDevice>,
}

/// Bus registry plus the host-bus root set
///
/// Built once per invocation with [`BusTree::build`] and dropped when
/// the command scope ends; nothing persists across runs.
pub struct BusTree<'a> {
    buses: Vec<BusNode<'a>>,
    roots: Vec<u8>,
}

impl<'a> BusTree<'a> {
    /// Fold a flat device sequence into the bus registry
    ///
    /// One pass, order-sensitive: a bus first seen through a device's
    /// own bus number becomes a host-bus root; a bus first seen inside a
    /// bridge's secondary..=subordinate range is parented to that bridge
    /// and never becomes a root. A later bridge claiming an existing bus
    /// overwrites its parent (last writer wins).
    pub fn build(devices: &'a [PciDevice]) -> Self {
        let mut tree = Self {
            buses: Vec::new(),
            roots: Vec::new(),
        };

        for dev in devices {
            let idx = match tree.index_of(dev.bus) {
                Some(i) => i,
                None => {
                    tree.roots.push(dev.bus);
                    tree.add_bus(dev.bus, None)
                }
            };

            if let Some(bridge) = dev.bridge {
                // Secondary bus 0 means the bridge decodes nothing:
                // only the host bridge can sit in front of bus 0.
                if bridge.secondary_bus != 0 {
                    for sub in bridge.secondary_bus..=bridge.subordinate_bus {
                        match tree.index_of(sub) {
                            Some(i) => {
                                log::debug!(
                                    "bus {:02x}: parent overwritten by bridge {}",
                                    sub,
                                    dev.bdf()
                                );
                                tree.buses[i].parent = Some(dev);
                            }
                            None => {
                                tree.add_bus(sub, Some(dev));
                            }
                        }
                    }
                }
            }

            tree.buses[idx].devices.push(dev);
        }

        tree
    }

    /// Look up a bus node by number
    pub fn bus(&self, number: u8) -> Option<&BusNode<'a>> {
        self.index_of(number).map(|i| &self.buses[i])
    }

    /// All registered buses, in insertion order
    pub fn buses(&self) -> &[BusNode<'a>] {
        &self.buses
    }

    /// Host-bus roots, in discovery order
    pub fn roots(&self) -> &[u8] {
        &self.roots
    }

    fn index_of(&self, number: u8) -> Option<usize> {
        self.buses.iter().position(|b| b.number == number)
    }

    fn add_bus(&mut self, number: u8, parent: Option<&'a PciDevice>) -> usize {
        self.buses.push(BusNode {
            number,
            parent,
            devices: Vec::new(),
        });
        self.buses.len() - 1
    }

    /// Render the tree depth-first from every host-bus root
    ///
    /// With `verbose`, device lines carry resolved class/vendor/device
    /// names (empty when unknown); otherwise raw hex IDs and the class
    /// code. Takes `&self` only; rendering twice gives identical output.
    pub fn render(&self, sink: &mut dyn Sink, names: &NameDb, verbose: bool) {
        let mut active = [false; 256];

        sink.attr("id", "0000");
        sink.open_container("domain");
        sink.open_list("bus");

        for &root in &self.roots {
            if let Some(node) = self.bus(root) {
                self.render_bus(sink, node, 1, names, verbose, &mut active);
            }
        }

        sink.close_list("bus");
        sink.close_container("domain");
    }

    fn render_bus(
        &self,
        sink: &mut dyn Sink,
        node: &BusNode<'a>,
        depth: usize,
        names: &NameDb,
        verbose: bool,
        active: &mut [bool; 256],
    ) {
        // A bridge claiming a bus that is already on the descent chain
        // would recurse forever; skip it.
        if active[node.number as usize] {
            log::warn!(
                "bus {:02x} already on the render path, skipping cycle",
                node.number
            );
            return;
        }
        active[node.number as usize] = true;

        sink.attr("id", &format!("{:04x}", node.number));
        sink.open_instance("bus");

        let parent_domain = node.parent.map_or(0, |p| p.domain);
        sink.text(&format!(
            "{:pad$}{:04x}:{:02x} =>\n",
            "",
            parent_domain,
            node.number,
            pad = (depth - 1) * 4
        ));

        sink.open_list("device");

        for dev in &node.devices {
            sink.open_instance("device");

            sink.text(&format!("{:pad$}", "", pad = depth * 4));
            sink.field("bdf", &dev.bdf());
            sink.text(" ");

            if verbose {
                sink.field("classname", class::class_name(dev.class).unwrap_or(""));
                sink.text(" ");
                sink.field("vendorname", names.vendor_name(dev.vendor_id).unwrap_or(""));
                sink.text(" ");
                sink.field(
                    "devname",
                    names.device_name(dev.vendor_id, dev.device_id).unwrap_or(""),
                );
                sink.text("\n");
            } else {
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
            }

            if let Some(bridge) = dev.bridge {
                if bridge.secondary_bus > 0 {
                    if let Some(sub) = self.bus(bridge.secondary_bus) {
                        sink.open_list("bus");
                        self.render_bus(sink, sub, depth + 1, names, verbose, active);
                        sink.close_list("bus");
                    }
                }
            }

            sink.close_instance("device");
        }

        sink.close_list("device");
        sink.close_instance("bus");

        active[node.number as usize] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::BridgeInfo;
    use crate::output::{JsonSink, TextSink};

    fn endpoint(bus: u8, device: u8) -> PciDevice {
        PciDevice {
            domain: 0,
            bus,
            device,
            function: 0,
            vendor_id: 0x8086,
            device_id: 0x10d3,
            subvendor_id: 0x8086,
            subdevice_id: 0x0001,
            class: 0x020000,
            revision: 0,
            bridge: None,
        }
    }

    fn bridge(bus: u8, device: u8, secondary: u8, subordinate: u8) -> PciDevice {
        PciDevice {
            domain: 0,
            bus,
            device,
            function: 0,
            vendor_id: 0x8086,
            device_id: 0x2448,
            subvendor_id: 0,
            subdevice_id: 0,
            class: 0x060400,
            revision: 0,
            bridge: Some(BridgeInfo {
                secondary_bus: secondary,
                subordinate_bus: subordinate,
            }),
        }
    }

    fn render_text(tree: &BusTree<'_>, verbose: bool) -> String {
        let mut buf = Vec::new();
        let mut sink = TextSink::new(&mut buf);
        tree.render(&mut sink, &NameDb::empty(), verbose);
        sink.finish().unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_bridge_before_child_nests() {
        // Scenario A: the bridge is enumerated before the bus it feeds
        let devices = vec![bridge(0, 0, 1, 1), endpoint(1, 0)];
        let tree = BusTree::build(&devices);

        assert_eq!(tree.roots(), &[0]);
        assert_eq!(tree.buses().len(), 2);
        assert_eq!(tree.bus(0).unwrap().devices.len(), 1);
        assert_eq!(tree.bus(1).unwrap().devices.len(), 1);
        assert_eq!(tree.bus(1).unwrap().parent.unwrap().bdf(), "0000:00:00.0");

        let out = render_text(&tree, false);
        let bus0 = out.find("0000:00 =>").unwrap();
        let bus1 = out.find("    0000:01 =>").unwrap();
        let child = out.find("        0000:01:00.0").unwrap();
        assert!(bus0 < bus1 && bus1 < child);
    }

    #[test]
    fn test_child_before_bridge_makes_two_roots() {
        // Scenario B: same topology, reverse enumeration order. Bus 1 is
        // classified as a root because its bridge has not been seen yet.
        let devices = vec![endpoint(1, 0), bridge(0, 0, 1, 1)];
        let tree = BusTree::build(&devices);

        assert_eq!(tree.roots(), &[1, 0]);
        // The bridge still re-parents bus 1 after the fact.
        assert!(tree.bus(1).unwrap().parent.is_some());
    }

    #[test]
    fn test_bridgeless_buses_are_independent_roots() {
        // Scenario C
        let devices = vec![endpoint(2, 0), endpoint(5, 0)];
        let tree = BusTree::build(&devices);

        assert_eq!(tree.roots(), &[2, 5]);
        let out = render_text(&tree, false);
        assert!(out.contains("0000:02 =>"));
        assert!(out.contains("0000:05 =>"));
        // Both trees render at depth 1: no nested indentation anywhere.
        assert!(!out.contains("        "));
    }

    #[test]
    fn test_every_referenced_bus_registered_once() {
        let devices = vec![bridge(0, 1, 4, 6), endpoint(5, 0), endpoint(0, 2)];
        let tree = BusTree::build(&devices);

        let mut numbers: Vec<u8> = tree.buses().iter().map(|b| b.number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec![0, 4, 5, 6]);
    }

    #[test]
    fn test_pre_created_bus_is_not_a_root() {
        let devices = vec![bridge(0, 0, 1, 1), endpoint(1, 0)];
        let tree = BusTree::build(&devices);
        assert!(!tree.roots().contains(&1));
    }

    #[test]
    fn test_secondary_zero_creates_nothing() {
        let devices = vec![bridge(0, 0, 0, 0)];
        let tree = BusTree::build(&devices);
        assert_eq!(tree.buses().len(), 1);
        assert_eq!(tree.roots(), &[0]);
    }

    #[test]
    fn test_empty_bridge_range_creates_nothing() {
        let devices = vec![bridge(0, 0, 5, 3)];
        let tree = BusTree::build(&devices);
        assert_eq!(tree.buses().len(), 1);
        assert!(tree.bus(5).is_none());
    }

    #[test]
    fn test_device_order_within_bus_is_stable() {
        let mut devices = Vec::new();
        for dev in 0..4 {
            devices.push(endpoint(3, dev));
            devices.push(endpoint(7, dev));
        }
        let tree = BusTree::build(&devices);

        let slots: Vec<u8> = tree.bus(3).unwrap().devices.iter().map(|d| d.device).collect();
        assert_eq!(slots, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_last_bridge_wins_reparenting() {
        let devices = vec![bridge(0, 0, 2, 2), bridge(0, 1, 2, 2)];
        let tree = BusTree::build(&devices);
        assert_eq!(tree.bus(2).unwrap().parent.unwrap().device, 1);
    }

    #[test]
    fn test_render_is_idempotent() {
        let devices = vec![bridge(0, 0, 1, 2), bridge(1, 0, 2, 2), endpoint(2, 0)];
        let tree = BusTree::build(&devices);
        assert_eq!(render_text(&tree, false), render_text(&tree, false));
    }

    #[test]
    fn test_render_survives_bridge_cycle() {
        // A bridge claiming its own bus must not hang the renderer.
        let devices = vec![bridge(0, 0, 1, 1), bridge(1, 0, 1, 1)];
        let tree = BusTree::build(&devices);
        let out = render_text(&tree, false);
        // Bus 1 renders once, under the bus 0 bridge.
        assert_eq!(out.matches("0000:01 =>").count(), 1);
    }

    #[test]
    fn test_json_structure_nests_buses() {
        let devices = vec![bridge(0, 0, 1, 1), endpoint(1, 0)];
        let tree = BusTree::build(&devices);

        let mut buf = Vec::new();
        let mut sink = JsonSink::new(&mut buf);
        tree.render(&mut sink, &NameDb::empty(), false);
        sink.finish().unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let bus0 = &doc["domain"]["bus"][0];
        assert_eq!(bus0["id"], "0000");
        let bridge_dev = &bus0["device"][0];
        assert_eq!(bridge_dev["bdf"], "0000:00:00.0");
        let nested = &bridge_dev["bus"][0];
        assert_eq!(nested["id"], "0001");
        assert_eq!(nested["device"][0]["bdf"], "0000:01:00.0");
    }

    #[test]
    fn test_verbose_render_with_empty_names() {
        // Unresolvable names render as empty strings, not errors.
        let devices = vec![endpoint(0, 0)];
        let tree = BusTree::build(&devices);
        let out = render_text(&tree, true);
        assert!(out.contains("0000:00:00.0 Network Controller, Ethernet"));
    }
}
