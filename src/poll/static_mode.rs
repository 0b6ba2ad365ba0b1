//! Static topology: a fixed per-slot sensor schema is pre-materialized at
//! startup, then bound to live SDR entries by name (`_search_sensors`)
//! whenever a slot's carrier ID changes. Slot structure never grows or
//! shrinks after [`StaticTopology::initialize`] runs.

use crate::transport::Transport;
use crate::tree::{ensure_container, FruFieldLeaf, Node, SensorKind, SensorLeaf, Tree};

use super::{scan, TopologyPolicy, SHELF_MANAGER_ADDRESS, SLOTS};

/// Sensor names every slot is assumed to carry. Not specified by any SDR
/// the shelf advertises ahead of time; this is the fixed schema the static
/// strategy binds against via `_search_sensors`.
const SLOT_SENSOR_NAMES: &[&str] = &[
    "Temp_Front",
    "Temp_Rear",
    "Temp_FPGA",
    "Temp_CPU",
    "Vcc_12V",
    "Vcc_3V3",
    "Vcc_2V5",
    "Vcc_1V8",
    "Vcc_Core",
    "Curr_12V",
    "Curr_3V3",
];

/// Bay index of a carrier's two AMC sites, per the ATCA-scale carriers this
/// strategy targets.
const AMC_BAYS: [u8; 2] = [0, 2];

/// RTM device bay, queried for presence before attempting the EEPROM read.
const RTM_BAY: u8 = 5;

/// FRU device id assumed for the RTM's own product-info area, since no SDR
/// locator resolves it the way `ShelfFRU1` does for the crate.
const RTM_FRU_ID: u8 = 1;

/// FRU device id assumed for the carrier's product-info area.
const CARRIER_FRU_ID: u8 = 0;

pub struct StaticTopology {
    need_search_sensors: [bool; 6],
}

impl StaticTopology {
    pub fn new() -> Self {
        Self {
            need_search_sensors: [true; 6],
        }
    }
}

impl Default for StaticTopology {
    fn default() -> Self {
        Self::new()
    }
}

fn slot_index(slot: u8) -> usize {
    (slot - 2) as usize
}

impl TopologyPolicy for StaticTopology {
    fn initialize(&mut self, tree: &Tree, transport: &mut Transport) {
        if let Err(e) = transport.open_target(SHELF_MANAGER_ADDRESS) {
            log::error!("static topology: failed to open shelf manager: {e:?}");
        } else {
            scan::scan_sensors(tree, transport, &["Crate"]);
        }

        for slot in SLOTS {
            let slot_str = slot.to_string();

            tree.with_root_mut(|root| {
                let slot_container = ensure_container(root, &["Slots", &slot_str]);

                for name in SLOT_SENSOR_NAMES {
                    slot_container.insert(*name, Node::Sensor(SensorLeaf::placeholder(SensorKind::Full)));
                }
            });

            tree.with_root_mut(|root| {
                let carrier_info = ensure_container(root, &["Slots", &slot_str, "CarrierInfo"]);
                carrier_info.insert("ID", Node::FruField(FruFieldLeaf::placeholder()));

                ensure_container(root, &["Slots", &slot_str, "RTMInfo"]);
                ensure_container(root, &["Slots", &slot_str, "AMCInfo", "0"]);
                ensure_container(root, &["Slots", &slot_str, "AMCInfo", "2"]);
            });
        }
    }

    fn pre_slot_update(&mut self, slot: u8, id_is_empty: bool, tree: &Tree, transport: &mut Transport) {
        let idx = slot_index(slot);

        if id_is_empty {
            self.need_search_sensors[idx] = true;
            return;
        }

        if !self.need_search_sensors[idx] {
            return;
        }

        log::info!("slot {slot}: carrier present, rebinding sensors");

        let slot_str = slot.to_string();
        let slot_path = ["Slots", slot_str.as_str()];

        scan::merge_product_info(tree, transport, &slot_path, "CarrierInfo", CARRIER_FRU_ID);
        scan::search_sensors(tree, transport, &slot_path);

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
                let rtm_info = ensure_container(root, &["Slots", slot_str.as_str(), "RTMInfo"]);
                rtm_info.insert("ID", Node::FruField(FruFieldLeaf { value: rtm_id }));
            });
            scan::merge_product_info(tree, transport, &slot_path, "RTMInfo", RTM_FRU_ID);
        }

        self.need_search_sensors[idx] = false;
    }

    fn slot_skip_keys(&self) -> &'static [&'static str] {
        &["CarrierInfo", "RTMInfo", "AMCInfo"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_index_maps_slot_range_to_zero_based_index() {
        assert_eq!(slot_index(2), 0);
        assert_eq!(slot_index(7), 5);
    }

    #[test]
    fn new_topology_starts_every_slot_needing_a_sensor_search() {
        let topology = StaticTopology::new();
        assert!(topology.need_search_sensors.iter().all(|&needs| needs));
    }

    #[test]
    fn amc_and_rtm_ids_nest_under_their_own_info_containers() {
        // Regression test for the shapes `pre_slot_update` must produce:
        // an AMC bay's `ID` lives under `AMCInfo/{bay}`, and the RTM's `ID`
        // lives under `RTMInfo`, not as siblings of those containers.
        let tree = Tree::new();
        tree.with_root_mut(|root| {
            let bay = ensure_container(root, &["Slots", "3", "AMCInfo", "0"]);
            bay.insert("ID", Node::FruField(FruFieldLeaf { value: "aabbcc".into() }));

            let rtm = ensure_container(root, &["Slots", "3", "RTMInfo"]);
            rtm.insert("ID", Node::FruField(FruFieldLeaf { value: "ddeeff".into() }));
        });

        tree.with_root_mut(|root| {
            let amc_info = ensure_container(root, &["Slots", "3", "AMCInfo"]);
            assert!(amc_info.get("ID").is_none());

            let bay = amc_info.get("0").and_then(Node::as_container).expect("AMCInfo/0");
            match bay.get("ID").expect("AMCInfo/0/ID") {
                Node::FruField(f) => assert_eq!(f.value, "aabbcc"),
                _ => panic!("expected a FruField leaf"),
            }

            let slot = ensure_container(root, &["Slots", "3"]);
            assert!(slot.get("ID").is_none());

            let rtm_info = slot.get("RTMInfo").and_then(Node::as_container).expect("RTMInfo");
            match rtm_info.get("ID").expect("RTMInfo/ID") {
                Node::FruField(f) => assert_eq!(f.value, "ddeeff"),
                _ => panic!("expected a FruField leaf"),
            }
        });
    }
}
