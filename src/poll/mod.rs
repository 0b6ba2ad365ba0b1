//! The poll engine: a single background task that repeatedly walks the
//! shelf manager and every slot IPMC, refreshing the sensor tree in place.
//!
//! The per-slot rebind decision (when to re-search or re-scan a slot's
//! sensors after a hot-swap) is delegated to a [`TopologyPolicy`]; the two
//! concrete strategies live in [`static_mode`] and [`dynamic_mode`].

pub mod dynamic_mode;
pub mod scan;
pub mod static_mode;

pub use dynamic_mode::DynamicTopology;
pub use static_mode::StaticTopology;

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::transport::{Transport, TransportError};
use crate::tree::{Node, Tree};

/// IPMB address of the shelf manager.
pub const SHELF_MANAGER_ADDRESS: u8 = 0x20;

/// Slots are numbered 2 through 7 on a standard ATCA shelf.
pub const SLOTS: std::ops::RangeInclusive<u8> = 2..=7;

/// The IPMB address of slot `slot`'s IPMC.
pub fn slot_ipmb_address(slot: u8) -> u8 {
    0x80 + 2 * slot
}

/// The per-topology-strategy hooks the poll engine defers to. `initialize`
/// runs once, before the first cycle; `pre_slot_update` runs at the start
/// of every slot's turn in every cycle, after the slot's `ID` has been
/// refreshed, and decides whether anything besides plain sensor reads is
/// needed this cycle.
pub trait TopologyPolicy {
    /// Build whatever fixed structure this strategy needs and populate the
    /// crate-level portion of the tree. Called once before the first cycle.
    fn initialize(&mut self, tree: &Tree, transport: &mut Transport);

    /// Called for slot `slot` (2..=7) every cycle, after `Slots/{slot}/ID`
    /// has been refreshed with the carrier's probed device ID.
    /// `id_is_empty` reports whether that probe came back empty, which
    /// both strategies treat as "nothing plugged in, don't bother reading
    /// sensors this cycle".
    fn pre_slot_update(&mut self, slot: u8, id_is_empty: bool, tree: &Tree, transport: &mut Transport);

    /// Child keys of a slot container that `_read_sensor` must not be
    /// applied to, because they are not `Sensor` leaves.
    fn slot_skip_keys(&self) -> &'static [&'static str];
}

/// Drives the per-cycle walk over the shelf manager and every slot.
pub struct PollEngine<P> {
    tree: Arc<Tree>,
    transport: Transport,
    policy: P,
}

impl<P: TopologyPolicy> PollEngine<P> {
    /// Open the shelf manager target and run `policy.initialize`, then
    /// return an engine ready for [`PollEngine::run`].
    pub fn new(tree: Arc<Tree>, mut transport: Transport, mut policy: P) -> Result<Self, TransportError> {
        transport.open_target(SHELF_MANAGER_ADDRESS)?;
        policy.initialize(&tree, &mut transport);

        Ok(Self {
            tree,
            transport,
            policy,
        })
    }

    /// Run cycles until `shutdown` is signalled. Each cycle's sleep is a
    /// `recv_timeout` against `shutdown`, so a shutdown signal interrupts
    /// an in-progress sleep immediately rather than waiting out the
    /// remainder of the period.
    pub fn run(mut self, shutdown: &Receiver<()>) {
        loop {
            let start = Instant::now();
            self.tree.set_timestamp(format!("{start:?}"));

            self.cycle();

            let elapsed = start.elapsed().as_secs_f64();
            self.tree.set_poll_period(elapsed);
            log::debug!("cycle finished in {elapsed:.3}s");

            let deficit = self.tree.min_poll_period() - elapsed;

            if deficit > 0.0 {
                if shutdown.recv_timeout(Duration::from_secs_f64(deficit)).is_ok() {
                    return;
                }
            } else if shutdown.try_recv().is_ok() {
                return;
            }
        }
    }

    fn cycle(&mut self) {
        self.update_crate();

        for slot in SLOTS {
            self.update_slot(slot);
        }
    }

    fn update_crate(&mut self) {
        if let Err(e) = self.transport.open_target(SHELF_MANAGER_ADDRESS) {
            log::error!("failed to open shelf manager at cycle start: {e:?}");
            return;
        }

        self.update_fan_trays();
        self.update_sensors_at(&["Crate"], &["FanTrays", "CrateInfo"]);
    }

    fn update_fan_trays(&mut self) {
        let tree = &self.tree;
        let transport = &mut self.transport;

        let names: Vec<String> = tree.with_root_mut(|root| {
            let fan_trays = crate::tree::ensure_container(root, &["Crate", "FanTrays"]);
            fan_trays.iter().map(|(k, _)| k.to_string()).collect()
        });

        for name in names {
            let fru_id = tree.with_root_mut(|root| {
                let fan_trays = crate::tree::ensure_container(root, &["Crate", "FanTrays"]);
                fan_trays.get(&name).and_then(Node::as_fan).map(|f| f.fru_id)
            });

            let Some(fru_id) = fru_id else { continue };

            let level = transport.get_fan_level(fru_id);
            let props = transport.get_fan_speed_properties(fru_id);

            tree.with_root_mut(|root| {
                let fan_trays = crate::tree::ensure_container(root, &["Crate", "FanTrays"]);
                let Some(fan) = fan_trays.get_mut(&name).and_then(Node::as_fan_mut) else {
                    return;
                };

                match level {
                    Ok(level) => fan.speed_level = crate::tree::ScalarValue::Int(level as i64),
                    Err(e) => log::warn!("getFanLevel(fru {fru_id}) failed: {e:?}"),
                }

                match props {
                    Ok((min, max)) => {
                        fan.minimum_speed_level = crate::tree::ScalarValue::Int(min as i64);
                        fan.maximum_speed_level = crate::tree::ScalarValue::Int(max as i64);
                    }
                    Err(e) => log::warn!("getFanSpeedProperties(fru {fru_id}) failed: {e:?}"),
                }
            });
        }
    }

    /// Refresh every `Sensor` leaf directly under `path`, skipping the
    /// named child keys (non-sensor subtrees).
    fn update_sensors_at(&mut self, path: &[&str], skip: &[&str]) {
        let tree = &self.tree;
        let transport = &mut self.transport;

        tree.with_root_mut(|root| {
            let container = crate::tree::ensure_container(root, path);

            for (key, node) in container.iter_mut() {
                if skip.contains(&key) {
                    continue;
                }

                if let Node::Sensor(leaf) = node {
                    scan::read_sensor(transport, leaf);
                }
            }
        });
    }

    fn update_slot(&mut self, slot: u8) {
        if let Err(e) = self.transport.open_target(slot_ipmb_address(slot)) {
            log::warn!("slot {slot}: failed to open target: {e:?}");
            return;
        }

        let carrier_id = self.transport.probe_device_id(4);
        let id_is_empty = carrier_id.is_empty();

        let slot_str = slot.to_string();
        let slot_path = ["Slots", slot_str.as_str()];

        self.tree.with_root_mut(|root| {
            let carrier_info = crate::tree::ensure_container(root, &["Slots", slot_str.as_str(), "CarrierInfo"]);
            carrier_info.insert(
                "ID",
                Node::FruField(crate::tree::FruFieldLeaf { value: carrier_id }),
            );
        });

        self.policy
            .pre_slot_update(slot, id_is_empty, &self.tree, &mut self.transport);

        if id_is_empty {
            return;
        }

        let skip = self.policy.slot_skip_keys();
        self.update_sensors_at(&slot_path, skip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FruFieldLeaf;

    #[test]
    fn slot_ipmb_address_maps_slot_range() {
        assert_eq!(slot_ipmb_address(2), 0x84);
        assert_eq!(slot_ipmb_address(7), 0x8E);
    }

    #[test]
    fn carrier_id_nests_under_carrier_info_not_the_slot_container() {
        // Regression test for the shape `update_slot` must produce: `ID` is
        // a child of `CarrierInfo`, never a sibling of it.
        let tree = Tree::new();
        tree.with_root_mut(|root| {
            let carrier_info = crate::tree::ensure_container(root, &["Slots", "2", "CarrierInfo"]);
            carrier_info.insert(
                "ID",
                Node::FruField(FruFieldLeaf {
                    value: "abc123".into(),
                }),
            );
        });

        tree.with_root_mut(|root| {
            let slot = crate::tree::ensure_container(root, &["Slots", "2"]);
            assert!(slot.get("ID").is_none());

            let carrier_info = slot
                .get("CarrierInfo")
                .and_then(Node::as_container)
                .expect("CarrierInfo container");

            match carrier_info.get("ID").expect("CarrierInfo.ID") {
                Node::FruField(f) => assert_eq!(f.value, "abc123"),
                _ => panic!("expected a FruField leaf"),
            }
        });
    }
}
