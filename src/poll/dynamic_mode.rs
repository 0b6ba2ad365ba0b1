//! Dynamic topology: the crate and every slot are SDR-scanned once at
//! startup and never rebuilt. Whatever sensors, FRU fields, and fan trays
//! each target advertised at that moment are what the tree has for the
//! lifetime of the process; hot-swap changes are not picked up.

use crate::transport::Transport;
use crate::tree::{ensure_container, FruFieldLeaf, Node, Tree};

use super::{scan, slot_ipmb_address, TopologyPolicy, SHELF_MANAGER_ADDRESS, SLOTS};

/// Bay index of a carrier's two AMC sites, mirroring [`super::static_mode`].
const AMC_BAYS: [u8; 2] = [0, 2];

/// RTM device bay, queried for presence before attempting the EEPROM read.
const RTM_BAY: u8 = 5;

/// FRU device id assumed for the RTM's own product-info area.
const RTM_FRU_ID: u8 = 1;

#[derive(Default)]
pub struct DynamicTopology;

impl DynamicTopology {
    pub fn new() -> Self {
        Self
    }
}

impl TopologyPolicy for DynamicTopology {
    fn initialize(&mut self, tree: &Tree, transport: &mut Transport) {
        if let Err(e) = transport.open_target(SHELF_MANAGER_ADDRESS) {
            log::error!("dynamic topology: failed to open shelf manager: {e:?}");
        } else {
            scan::scan_sensors(tree, transport, &["Crate"]);
        }

        for slot in SLOTS {
            if let Err(e) = transport.open_target(slot_ipmb_address(slot)) {
                log::warn!("slot {slot}: failed to open target during initial scan: {e:?}");
                continue;
            }

            let slot_str = slot.to_string();
            scan::scan_sensors(tree, transport, &["Slots", &slot_str]);

            let slot_path = ["Slots", slot_str.as_str()];

            for bay in AMC_BAYS {
                let id = transport.probe_device_id(bay);
                if id.is_empty() {
                    continue;
                }

                let bay_str = bay.to_string();
                tree.with_root_mut(|root| {
                    let bay_container = ensure_container(root, &["Slots", slot_str.as_str(), "AMCInfo", &bay_str]);
                    bay_container.insert("ID", Node::FruField(FruFieldLeaf { value: id }));
                });

                match transport.read_amc_eeprom(bay) {
                    Ok(dump) if !dump.is_empty() => {
                        let fields = crate::fru::decode_eeprom(&dump, crate::fru::AMC_FIELDS, crate::fru::AMC_START_CURSOR);
                        let amc_path = ["Slots", slot_str.as_str(), "AMCInfo"];
                        scan::merge_eeprom_fields(tree, &amc_path, &bay_str, fields);
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("slot {slot} AMC bay {bay} eeprom read failed: {e:?}"),
                }
            }

            let rtm_id = transport.probe_device_id(RTM_BAY);
            if !rtm_id.is_empty() {
                tree.with_root_mut(|root| {
                    let rtm = ensure_container(root, &["Slots", slot_str.as_str(), "RTM"]);
                    rtm.insert("ID", Node::FruField(FruFieldLeaf { value: rtm_id }));
                });
                scan::merge_product_info(tree, transport, &slot_path, "RTM", RTM_FRU_ID);
            }
        }
    }

    fn pre_slot_update(&mut self, _slot: u8, _id_is_empty: bool, _tree: &Tree, _transport: &mut Transport) {
        // Topology is fixed at startup; nothing to rebind.
    }

    fn slot_skip_keys(&self) -> &'static [&'static str] {
        &["RTM", "AMCInfo"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_keys_match_the_containers_initialize_creates() {
        let topology = DynamicTopology::new();
        assert_eq!(topology.slot_skip_keys(), &["RTM", "AMCInfo"]);
    }

    #[test]
    fn rtm_id_nests_under_the_rtm_container_not_as_a_sibling() {
        let tree = Tree::new();
        tree.with_root_mut(|root| {
            let rtm = ensure_container(root, &["Slots", "4", "RTM"]);
            rtm.insert("ID", Node::FruField(FruFieldLeaf { value: "112233".into() }));
        });

        tree.with_root_mut(|root| {
            let slot = ensure_container(root, &["Slots", "4"]);
            assert!(slot.get("ID").is_none());

            let rtm = slot.get("RTM").and_then(Node::as_container).expect("RTM container");
            match rtm.get("ID").expect("RTM/ID") {
                Node::FruField(f) => assert_eq!(f.value, "112233"),
                _ => panic!("expected a FruField leaf"),
            }
        });
    }
}
