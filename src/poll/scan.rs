//! Shared SDR walking routines used by both topology strategies:
//! `scan_sensors` populates whatever the currently open target advertises,
//! `search_sensors` only binds `sensorRef` for names that already exist as
//! pre-materialized leaves.

use crate::storage::sdr::record::{FruDeviceLocator, RecordContents, SensorId, SensorRecord};
use crate::transport::Transport;
use crate::tree::{
    ensure_container, Container, FanLeaf, FruFieldLeaf, Node, ScalarValue, SensorKind,
    SensorLeaf, SensorRef, Tree,
};

fn sensor_id_name(id: &SensorId) -> String {
    match id {
        SensorId::Unicode(s) | SensorId::Ascii8BAndLatin1(s) => crate::tree::sanitize_name(s.as_bytes()),
        SensorId::BCDPlus(bytes) | SensorId::Ascii6BPacked(bytes) => crate::tree::sanitize_name(bytes),
    }
}

fn fru_device_id(locator: &FruDeviceLocator) -> u8 {
    use crate::storage::sdr::record::FruDevice;

    match &locator.record_key.fru_device {
        FruDevice::Logical(l) => l.fru_device_id,
        FruDevice::Physical(p) => p.i2c_address,
    }
}

fn read_full(transport: &mut Transport, number: u8, record: &crate::storage::sdr::record::FullSensorRecord) -> ScalarValue {
    match transport.get_sensor_reading(number) {
        Ok((Some(raw), _)) => record
            .convert(raw)
            .map(|v| ScalarValue::Float(v.value() as f64))
            .unwrap_or(ScalarValue::Float(0.0)),
        _ => ScalarValue::Float(0.0),
    }
}

fn read_compact(transport: &mut Transport, number: u8) -> ScalarValue {
    match transport.get_sensor_reading(number) {
        Ok((Some(raw), _)) => ScalarValue::Int(raw as i64),
        _ => ScalarValue::Int(0),
    }
}

/// Fully populate the container at `path` from whatever SDR entries the
/// currently-open target advertises: full/compact sensors become Sensor
/// leaves, fan-tray locators become Fan leaves under `FanTrays`, and the
/// `ShelfFRU1` locator's product-info area becomes `CrateInfo` fields.
pub fn scan_sensors(tree: &Tree, transport: &mut Transport, path: &[&str]) {
    let records: Vec<_> = match transport.iter_sdr() {
        Ok(iter) => iter.collect(),
        Err(e) => {
            log::error!("SDR scan at {path:?} aborted: {e:?}");
            return;
        }
    };

    for record in records {
        match &record.contents {
            RecordContents::FullSensor(full) => {
                let name = sensor_id_name(full.id_string());
                let number = full.sensor_number().get();
                let value = read_full(transport, number, full);

                tree.with_root_mut(|root| {
                    let container = ensure_container(root, path);
                    container.insert(
                        name,
                        Node::Sensor(SensorLeaf {
                            kind: SensorKind::Full,
                            sensor_ref: Some(SensorRef::full(number, full.clone())),
                            value,
                            callback: None,
                        }),
                    );
                });
            }
            RecordContents::CompactSensor(compact) => {
                let name = sensor_id_name(compact.id_string());
                let number = compact.sensor_number().get();
                let value = read_compact(transport, number);

                tree.with_root_mut(|root| {
                    let container = ensure_container(root, path);
                    container.insert(
                        name,
                        Node::Sensor(SensorLeaf {
                            kind: SensorKind::Compact,
                            sensor_ref: Some(SensorRef::compact(number)),
                            value,
                            callback: None,
                        }),
                    );
                });
            }
            RecordContents::FruDeviceLocator(locator) => {
                let name = sensor_id_name(&locator.id_string);

                if name.contains("FanTray") {
                    let fru_id = fru_device_id(locator);
                    let mut fan_trays_path: Vec<&str> = path.to_vec();
                    fan_trays_path.push("FanTrays");

                    tree.with_root_mut(|root| {
                        let fan_trays = ensure_container(root, &fan_trays_path);
                        fan_trays.insert(name, Node::Fan(FanLeaf::new(fru_id)));
                    });
                } else if name == "ShelfFRU1" {
                    let fru_id = fru_device_id(locator);
                    merge_product_info(tree, transport, path, "CrateInfo", fru_id);
                }
            }
            RecordContents::Unknown { .. } => {}
        }
    }
}

/// Read and decode `fru_id`'s product-info area, merging its fields into
/// the container at `path`/`subkey`. Failure leaves existing values
/// untouched.
pub fn merge_product_info(
    tree: &Tree,
    transport: &mut Transport,
    path: &[&str],
    subkey: &str,
    fru_id: u8,
) {
    let area = match transport.get_fru_product_info_area(fru_id) {
        Ok(area) => area,
        Err(e) => {
            log::warn!("FRU product-info read for fru {fru_id} failed: {e:?}");
            return;
        }
    };

    let fields = crate::fru::decode_product_info_area(&area);

    let mut target_path: Vec<&str> = path.to_vec();
    target_path.push(subkey);

    tree.with_root_mut(|root| {
        let container = ensure_container(root, &target_path);
        for (key, value) in fields {
            container.insert(key, Node::FruField(FruFieldLeaf { value }));
        }
    });
}

/// Read and decode an AMC or RTM EEPROM dump, merging its fields into the
/// container at `path`/`subkey`.
pub fn merge_eeprom_fields(tree: &Tree, path: &[&str], subkey: &str, fields: crate::fru::FieldMap) {
    let mut target_path: Vec<&str> = path.to_vec();
    target_path.push(subkey);

    tree.with_root_mut(|root| {
        let container = ensure_container(root, &target_path);
        for (key, value) in fields {
            container.insert(key, Node::FruField(FruFieldLeaf { value }));
        }
    });
}

/// Walk the currently-open target's SDR entries, but only *bind*
/// `sensor_ref` for names that already exist as pre-materialized leaves at
/// `path`; unrecognized names are ignored. Returns the number of sensors
/// bound.
pub fn search_sensors(tree: &Tree, transport: &mut Transport, path: &[&str]) -> usize {
    let records: Vec<_> = match transport.iter_sdr() {
        Ok(iter) => iter.collect(),
        Err(e) => {
            log::error!("SDR search at {path:?} aborted: {e:?}");
            return 0;
        }
    };

    let mut bound = 0;

    for record in records {
        let (name, kind, number, full_record) = match &record.contents {
            RecordContents::FullSensor(full) => (
                sensor_id_name(full.id_string()),
                SensorKind::Full,
                full.sensor_number().get(),
                Some(full.clone()),
            ),
            RecordContents::CompactSensor(compact) => (
                sensor_id_name(compact.id_string()),
                SensorKind::Compact,
                compact.sensor_number().get(),
                None,
            ),
            _ => continue,
        };

        let existed = tree.with_root_mut(|root| -> bool {
            let container = match navigate_mut(root, path) {
                Some(c) => c,
                None => return false,
            };

            let Some(Node::Sensor(leaf)) = container.get_mut(&name) else {
                return false;
            };

            leaf.kind = kind;
            leaf.sensor_ref = Some(SensorRef {
                number,
                full_record: full_record.clone(),
            });

            true
        });

        if existed {
            bound += 1;
        }
    }

    bound
}

fn navigate_mut<'a>(root: &'a mut Container, path: &[&str]) -> Option<&'a mut Container> {
    let mut current = root;

    for key in path {
        current = current.get_mut(key).and_then(Node::as_container_mut)?;
    }

    Some(current)
}

/// `_read_sensor`: refresh one sensor leaf's value from its bound
/// `sensor_ref`, or leave it at `0` if unbound. Transport errors are
/// logged and also yield `0`; the tree structure is never touched.
pub fn read_sensor(transport: &mut Transport, leaf: &mut SensorLeaf) {
    let Some(sensor_ref) = leaf.sensor_ref.clone() else {
        leaf.value = match leaf.kind {
            SensorKind::Full => ScalarValue::Float(0.0),
            SensorKind::Compact => ScalarValue::Int(0),
        };
        return;
    };

    leaf.value = match transport.get_sensor_reading(sensor_ref.number) {
        Ok((Some(raw), _)) => match (&sensor_ref.full_record, leaf.kind) {
            (Some(record), SensorKind::Full) => record
                .convert(raw)
                .map(|v| ScalarValue::Float(v.value() as f64))
                .unwrap_or(ScalarValue::Float(0.0)),
            _ => ScalarValue::Int(raw as i64),
        },
        Ok((None, _)) => match leaf.kind {
            SensorKind::Full => ScalarValue::Float(0.0),
            SensorKind::Compact => ScalarValue::Int(0),
        },
        Err(e) => {
            log::warn!("sensor {} read failed: {e:?}", sensor_ref.number);
            match leaf.kind {
                SensorKind::Full => ScalarValue::Float(0.0),
                SensorKind::Compact => ScalarValue::Int(0),
            }
        }
    };

    if let Some(callback) = &leaf.callback {
        callback(&leaf.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Transport;

    #[test]
    fn read_sensor_zeroes_unbound_full_leaf_without_touching_transport() {
        let mut transport = Transport::new("unused", 0);
        let mut leaf = SensorLeaf {
            kind: SensorKind::Full,
            sensor_ref: None,
            value: ScalarValue::Float(99.0),
            callback: None,
        };

        read_sensor(&mut transport, &mut leaf);

        assert_eq!(leaf.value, ScalarValue::Float(0.0));
    }

    #[test]
    fn read_sensor_zeroes_unbound_compact_leaf() {
        let mut transport = Transport::new("unused", 0);
        let mut leaf = SensorLeaf {
            kind: SensorKind::Compact,
            sensor_ref: None,
            value: ScalarValue::Int(7),
            callback: None,
        };

        read_sensor(&mut transport, &mut leaf);

        assert_eq!(leaf.value, ScalarValue::Int(0));
    }

    #[test]
    fn read_sensor_falls_back_to_zero_on_transport_error() {
        // No target has been opened, so the read fails locally without any
        // network I/O: `Transport::ipmi_mut` rejects immediately.
        let mut transport = Transport::new("unused", 0);
        let mut leaf = SensorLeaf {
            kind: SensorKind::Full,
            sensor_ref: Some(SensorRef::compact(3)),
            value: ScalarValue::Float(12.0),
            callback: None,
        };

        read_sensor(&mut transport, &mut leaf);

        assert_eq!(leaf.value, ScalarValue::Float(0.0));
    }
}
