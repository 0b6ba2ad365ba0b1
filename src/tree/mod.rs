//! The Sensor Tree: a hierarchical, path-addressed store of sensor
//! readings, FRU inventory, and fan-speed records, plus the read-side
//! Query Interface consumed by the publication layer.
//!
//! The poll engine is the tree's sole mutator; everything else — the
//! query getters below, and any registered callbacks — only reads.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::storage::sdr::record::FullSensorRecord;

/// A scalar leaf value: sensors are floats or ints, most everything else
/// (IDs, FRU fields) is a string.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Float(f64),
    Int(i64),
    Str(String),
}

impl ScalarValue {
    /// Round a floating-point value to 2 decimal places, per the Query
    /// Interface's `getValue` contract; other kinds pass through unchanged.
    pub fn rounded(&self) -> Self {
        match self {
            ScalarValue::Float(v) => ScalarValue::Float((v * 100.0).round() / 100.0),
            other => other.clone(),
        }
    }
}

impl Default for ScalarValue {
    fn default() -> Self {
        ScalarValue::Float(0.0)
    }
}

/// A callback invoked by the poll engine with a leaf's latest value after
/// each successful update. Must not block or mutate the tree.
pub type Callback = Arc<dyn Fn(&ScalarValue) + Send + Sync>;

/// Whether a sensor leaf's value is already in engineering units (`Full`)
/// or a raw reading (`Compact`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Full,
    Compact,
}

/// A handle back to the SDR entry backing a sensor leaf, bound once the
/// topology has been searched or scanned. Full sensors carry their SDR
/// record so readings can be converted to engineering units; compact
/// sensors carry raw readings directly and need no conversion record.
#[derive(Clone)]
pub struct SensorRef {
    pub number: u8,
    pub full_record: Option<FullSensorRecord>,
}

impl SensorRef {
    pub fn full(number: u8, record: FullSensorRecord) -> Self {
        Self {
            number,
            full_record: Some(record),
        }
    }

    pub fn compact(number: u8) -> Self {
        Self {
            number,
            full_record: None,
        }
    }
}

/// An analog or discrete sensor leaf.
#[derive(Clone)]
pub struct SensorLeaf {
    pub kind: SensorKind,
    pub sensor_ref: Option<SensorRef>,
    pub value: ScalarValue,
    pub callback: Option<Callback>,
}

impl SensorLeaf {
    /// A not-yet-bound placeholder leaf, seeded per invariant I5.
    pub fn placeholder(kind: SensorKind) -> Self {
        Self {
            kind,
            sensor_ref: None,
            value: ScalarValue::Float(0.0),
            callback: None,
        }
    }
}

/// A decoded FRU inventory field (product-info area or EEPROM field).
#[derive(Debug, Clone)]
pub struct FruFieldLeaf {
    pub value: String,
}

impl FruFieldLeaf {
    pub fn placeholder() -> Self {
        Self {
            value: String::new(),
        }
    }
}

/// A fan-tray record, populated by `getFanLevel`/`getFanSpeedProperties`.
#[derive(Debug, Clone)]
pub struct FanLeaf {
    pub fru_id: u8,
    pub speed_level: ScalarValue,
    pub minimum_speed_level: ScalarValue,
    pub maximum_speed_level: ScalarValue,
}

impl FanLeaf {
    pub fn new(fru_id: u8) -> Self {
        Self {
            fru_id,
            speed_level: ScalarValue::Int(0),
            minimum_speed_level: ScalarValue::Int(0),
            maximum_speed_level: ScalarValue::Int(0),
        }
    }

    /// Resolve one of this record's three named attributes.
    fn attr(&self, name: &str) -> Option<&ScalarValue> {
        match name {
            "speed_level" => Some(&self.speed_level),
            "minimum_speed_level" => Some(&self.minimum_speed_level),
            "maximum_speed_level" => Some(&self.maximum_speed_level),
            _ => None,
        }
    }

    fn attr_mut(&mut self, name: &str) -> Option<&mut ScalarValue> {
        match name {
            "speed_level" => Some(&mut self.speed_level),
            "minimum_speed_level" => Some(&mut self.minimum_speed_level),
            "maximum_speed_level" => Some(&mut self.maximum_speed_level),
            _ => None,
        }
    }
}

/// A node of the sensor tree: either a container or one of the three leaf
/// kinds. Never both (I1).
#[derive(Clone)]
pub enum Node {
    Container(Container),
    Sensor(SensorLeaf),
    FruField(FruFieldLeaf),
    Fan(FanLeaf),
}

impl Node {
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Node::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            Node::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_sensor(&self) -> Option<&SensorLeaf> {
        match self {
            Node::Sensor(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sensor_mut(&mut self) -> Option<&mut SensorLeaf> {
        match self {
            Node::Sensor(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_fan(&self) -> Option<&FanLeaf> {
        match self {
            Node::Fan(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_fan_mut(&mut self) -> Option<&mut FanLeaf> {
        match self {
            Node::Fan(f) => Some(f),
            _ => None,
        }
    }
}

/// An ordered string-keyed mapping from child key to node. Preserves
/// insertion order for deterministic traversal (§4.3).
#[derive(Clone, Default)]
pub struct Container {
    entries: Vec<(String, Node)>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert `node` under `key`, preserving the slot's original position
    /// if the key already exists (I7: only `value`/`sensorRef` may change
    /// across polls, not the shape of the tree).
    pub fn insert(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();

        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = node;
        } else {
            self.entries.push((key, node));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Node)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }
}

/// A path resolves either to a full node or, when it descends one level
/// into a [`FanLeaf`]'s named attributes, to a bare scalar.
enum Resolved<'a> {
    Node(&'a Node),
    Scalar(&'a ScalarValue),
}

fn walk<'a>(root: &'a Container, path: &[&str]) -> Option<Resolved<'a>> {
    let mut node = root.get(path.first()?)?;
    let mut i = 1;

    while i < path.len() {
        match node {
            Node::Container(c) => {
                node = c.get(path[i])?;
                i += 1;
            }
            Node::Fan(fan) if i == path.len() - 1 => {
                return Some(Resolved::Scalar(fan.attr(path[i])?));
            }
            _ => return None,
        }
    }

    Some(Resolved::Node(node))
}

/// Error returned when a path does not resolve to an existing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNotFound;

/// The sensor tree plus its health metadata, guarded by a single
/// reader/writer lock. The poll engine is the only writer; the Query
/// Interface and callbacks only read.
pub struct Tree {
    root: RwLock<Container>,
    timestamp: RwLock<Option<String>>,
    poll_period: RwLock<f64>,
    min_poll_period: RwLock<f64>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Container::new()),
            timestamp: RwLock::new(None),
            poll_period: RwLock::new(0.0),
            min_poll_period: RwLock::new(5.0),
        }
    }

    /// Run `f` against the tree's root container with exclusive access.
    /// Used exclusively by the poll engine during topology construction
    /// and per-cycle updates.
    pub fn with_root_mut<R>(&self, f: impl FnOnce(&mut Container) -> R) -> R {
        let mut root = self.root.write();
        f(&mut root)
    }

    /// `getSubtree(path)`: a snapshot clone of the container at `path`.
    /// An empty path returns the whole tree.
    pub fn get_subtree(&self, path: &[&str]) -> Result<Container, PathNotFound> {
        let root = self.root.read();

        if path.is_empty() {
            return Ok(root.clone());
        }

        match walk(&root, path) {
            Some(Resolved::Node(Node::Container(c))) => Ok(c.clone()),
            _ => Err(PathNotFound),
        }
    }

    /// `getValue(path)`: the scalar at `path`, floats rounded to 2 places.
    pub fn get_value(&self, path: &[&str]) -> Result<ScalarValue, PathNotFound> {
        let root = self.root.read();

        let value = match walk(&root, path) {
            Some(Resolved::Scalar(v)) => v.clone(),
            Some(Resolved::Node(Node::Sensor(s))) => s.value.clone(),
            Some(Resolved::Node(Node::FruField(f))) => ScalarValue::Str(f.value.clone()),
            _ => return Err(PathNotFound),
        };

        Ok(value.rounded())
    }

    /// `setCallback(path, fn)`: attach a callback to the sensor leaf at
    /// `path`. Only sensor leaves carry callbacks.
    pub fn set_callback(&self, path: &[&str], callback: Callback) -> Result<(), PathNotFound> {
        let mut root = self.root.write();
        let (parent_path, leaf_key) = path.split_at(path.len().saturating_sub(1));
        let leaf_key = leaf_key.first().ok_or(PathNotFound)?;

        let parent = if parent_path.is_empty() {
            &mut *root
        } else {
            let mut current = &mut *root;
            for key in parent_path {
                current = current
                    .get_mut(key)
                    .and_then(Node::as_container_mut)
                    .ok_or(PathNotFound)?;
            }
            current
        };

        let sensor = parent
            .get_mut(leaf_key)
            .and_then(Node::as_sensor_mut)
            .ok_or(PathNotFound)?;

        sensor.callback = Some(callback);
        Ok(())
    }

    /// The opaque timestamp of the last cycle start.
    pub fn timestamp(&self) -> Option<String> {
        self.timestamp.read().clone()
    }

    pub fn set_timestamp(&self, value: String) {
        *self.timestamp.write() = Some(value);
    }

    /// The last measured cycle duration, in seconds.
    pub fn poll_period(&self) -> f64 {
        *self.poll_period.read()
    }

    pub fn set_poll_period(&self, value: f64) {
        *self.poll_period.write() = value;
    }

    pub fn min_poll_period(&self) -> f64 {
        *self.min_poll_period.read()
    }

    /// Set the minimum inter-cycle period. Negative values are rejected
    /// silently (I6) and leave the prior value in place.
    pub fn set_min_poll_period(&self, value: f64) {
        if value >= 0.0 {
            *self.min_poll_period.write() = value;
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Sanitize an SDR device-ID-string-derived name for use as a tree key:
/// ASCII decode, spaces and dots become `_`.
pub fn sanitize_name(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b as char {
            ' ' | '.' => '_',
            c => c,
        })
        .collect()
}

/// Navigate from `root` to the container at `path`, creating empty
/// containers for any missing intermediate segment.
pub fn ensure_container<'a>(root: &'a mut Container, path: &[&str]) -> &'a mut Container {
    let mut current = root;

    for key in path {
        if !current.contains_key(key) {
            current.insert(*key, Node::Container(Container::new()));
        }

        current = current
            .get_mut(key)
            .and_then(Node::as_container_mut)
            .expect("just inserted or pre-existing container");
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_value_rounds_floats_to_two_places() {
        let tree = Tree::new();
        tree.with_root_mut(|root| {
            root.insert(
                "Temp",
                Node::Sensor(SensorLeaf {
                    kind: SensorKind::Full,
                    sensor_ref: Some(SensorRef::compact(3)),
                    value: ScalarValue::Float(12.3456),
                    callback: None,
                }),
            );
        });

        let value = tree.get_value(&["Temp"]).unwrap();
        assert_eq!(value, ScalarValue::Float(12.35));
    }

    #[test]
    fn unknown_path_is_not_found() {
        let tree = Tree::new();
        assert_eq!(tree.get_value(&["nope"]), Err(PathNotFound));
    }

    #[test]
    fn fan_leaf_attributes_resolve_one_level_deep() {
        let tree = Tree::new();
        tree.with_root_mut(|root| {
            let mut fan = FanLeaf::new(7);
            fan.speed_level = ScalarValue::Int(42);
            root.insert("FanTray_1", Node::Fan(fan));
        });

        let value = tree.get_value(&["FanTray_1", "speed_level"]).unwrap();
        assert_eq!(value, ScalarValue::Int(42));
    }

    #[test]
    fn min_poll_period_rejects_negative_values() {
        let tree = Tree::new();
        tree.set_min_poll_period(10.0);
        tree.set_min_poll_period(-1.0);
        assert_eq!(tree.min_poll_period(), 10.0);
    }

    #[test]
    fn insert_preserves_original_slot_on_update() {
        let mut c = Container::new();
        c.insert("a", Node::FruField(FruFieldLeaf::placeholder()));
        c.insert("b", Node::FruField(FruFieldLeaf::placeholder()));
        c.insert(
            "a",
            Node::FruField(FruFieldLeaf {
                value: "updated".into(),
            }),
        );

        let keys: Vec<_> = c.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn sanitize_name_replaces_spaces_and_dots() {
        assert_eq!(sanitize_name(b"Fan Tray.1"), "Fan_Tray_1");
    }
}
