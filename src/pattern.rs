//! Pattern - Bipartite connectivity between the ports of two units
//!
//! A pattern is scoped to two disjoint port universes (A and B), each
//! described by a set of selectors. Connections run from an output port in
//! one universe to an input port in the other, in either direction, and
//! only ever join ports of the same kind.
//!
//! Every insertion is validated on its own and is either applied whole or
//! rejected without touching the pattern.
//!
//! Once handed to the execution manager a pattern is treated as immutable
//! configuration; it serializes to JSON as the manager payload.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};
use crate::port::{Direction, Port, PortKind};
use crate::selector::{join_selectors, parse_selector_string, PortSelector};
use crate::unit::PortSource;

/// One of the two universes of a pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Directed connection between two ports of the same kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source: Port,
    pub destination: Port,
    pub weight: f32,
}

impl Connection {
    pub fn kind(&self) -> PortKind {
        self.source.kind()
    }
}

/// Serialized form of a `Pattern`; deserialization replays it through `connect`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternRecord {
    universe_a: Vec<PortSelector>,
    universe_b: Vec<PortSelector>,
    #[serde(default)]
    kinds: BTreeMap<String, PortKind>,
    #[serde(default)]
    connections: Vec<Connection>,
}

/// Connectivity pattern between two port universes
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "PatternRecord", into = "PatternRecord")]
pub struct Pattern {
    universe_a: Vec<PortSelector>,
    universe_b: Vec<PortSelector>,
    connections: Vec<Connection>,
    /// (source id, destination id) -> position in `connections`
    index: HashMap<(String, String), usize>,
    /// Kind tag of every port referenced by a connection
    kinds: BTreeMap<String, PortKind>,
}

impl Pattern {
    /// Create an empty pattern scoped to two selector universes.
    pub fn create(universe_a: Vec<PortSelector>, universe_b: Vec<PortSelector>) -> Result<Self> {
        if universe_a.is_empty() || universe_b.is_empty() {
            return Err(WireError::InvalidSelector(
                "pattern universes must not be empty".to_string(),
            ));
        }
        for a in &universe_a {
            for b in &universe_b {
                if a == b || a.covers(b) || b.covers(a) {
                    return Err(WireError::InvalidSelector(format!(
                        "universes overlap: {} and {}",
                        a, b
                    )));
                }
            }
        }

        Ok(Self {
            universe_a,
            universe_b,
            connections: Vec::new(),
            index: HashMap::new(),
            kinds: BTreeMap::new(),
        })
    }

    /// Create a pattern from two comma-joined selector strings.
    pub fn from_selector_strings(a: &str, b: &str) -> Result<Self> {
        Self::create(parse_selector_string(a)?, parse_selector_string(b)?)
    }

    /// Pattern whose universes are the whole port sets of two units.
    pub fn between<U: PortSource + ?Sized, V: PortSource + ?Sized>(a: &U, b: &V) -> Result<Self> {
        if a.unit_id() == b.unit_id() {
            return Err(WireError::InvalidSelector(format!(
                "pattern needs two distinct units, got {} twice",
                a.unit_id()
            )));
        }
        Self::create(
            vec![PortSelector::unit(a.unit_id())?],
            vec![PortSelector::unit(b.unit_id())?],
        )
    }

    /// Insert a connection from `source` to `destination`.
    ///
    /// Inserting an existing pair keeps a single entry and overwrites its weight.
    pub fn connect(&mut self, source: &Port, destination: &Port, weight: f32) -> Result<()> {
        if source.kind() != destination.kind() {
            return Err(WireError::TypeMismatch {
                source_id: source.id().to_string(),
                source_kind: source.kind(),
                destination_id: destination.id().to_string(),
                destination_kind: destination.kind(),
            });
        }
        if source.direction() != Direction::Out || destination.direction() != Direction::In {
            return Err(WireError::DirectionMismatch {
                source_id: source.id().to_string(),
                source_dir: source.direction(),
                destination_id: destination.id().to_string(),
                destination_dir: destination.direction(),
            });
        }

        let src_side = self.side_of(source.id())?;
        let dst_side = self.side_of(destination.id())?;
        if src_side == dst_side {
            return Err(WireError::PortNotInUniverse(format!(
                "{} and {} are both in universe {:?}",
                source, destination, src_side
            )));
        }

        if !weight.is_finite() || weight < 0.0 {
            return Err(WireError::InvalidWeight(weight));
        }

        // Check both tags before writing either
        self.check_kind(source)?;
        self.check_kind(destination)?;
        self.kinds.insert(source.id().to_string(), source.kind());
        self.kinds.insert(destination.id().to_string(), destination.kind());

        let key = (source.id().to_string(), destination.id().to_string());
        match self.index.get(&key) {
            Some(&i) => self.connections[i].weight = weight,
            None => {
                self.index.insert(key, self.connections.len());
                self.connections.push(Connection {
                    source: source.clone(),
                    destination: destination.clone(),
                    weight,
                });
            }
        }
        Ok(())
    }

    fn check_kind(&self, port: &Port) -> Result<()> {
        match self.kinds.get(port.id()) {
            Some(&existing) if existing != port.kind() => Err(WireError::KindConflict {
                port: port.id().to_string(),
                existing,
                requested: port.kind(),
            }),
            _ => Ok(()),
        }
    }

    /// Which universe a port id belongs to.
    pub fn side_of(&self, port_id: &str) -> Result<Side> {
        let in_a = self.universe_a.iter().any(|s| s.matches(port_id));
        let in_b = self.universe_b.iter().any(|s| s.matches(port_id));
        match (in_a, in_b) {
            (true, false) => Ok(Side::A),
            (false, true) => Ok(Side::B),
            (true, true) => Err(WireError::PortNotInUniverse(format!(
                "{} is matched by both universes",
                port_id
            ))),
            (false, false) => Err(WireError::PortNotInUniverse(port_id.to_string())),
        }
    }

    pub fn contains(&self, source_id: &str, destination_id: &str) -> bool {
        self.index
            .contains_key(&(source_id.to_string(), destination_id.to_string()))
    }

    /// Weight of a connection, if present
    pub fn weight(&self, source_id: &str, destination_id: &str) -> Option<f32> {
        self.index
            .get(&(source_id.to_string(), destination_id.to_string()))
            .map(|&i| self.connections[i].weight)
    }

    /// Connections in insertion order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections whose source lies in universe `from`
    pub fn from_side(&self, from: Side) -> impl Iterator<Item = &Connection> + '_ {
        self.connections
            .iter()
            .filter(move |c| self.side_of(c.source.id()).ok() == Some(from))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Kind tag recorded for a port referenced by this pattern
    pub fn kind_of(&self, port_id: &str) -> Option<PortKind> {
        self.kinds.get(port_id).copied()
    }

    pub fn universe(&self, side: Side) -> &[PortSelector] {
        match side {
            Side::A => &self.universe_a,
            Side::B => &self.universe_b,
        }
    }

    /// Comma-joined selector string for one universe
    pub fn universe_selector_string(&self, side: Side) -> String {
        join_selectors(self.universe(side).iter().map(PortSelector::as_str))
    }

    /// Unit id of a universe when every selector on that side pins the same unit
    pub fn unit_id(&self, side: Side) -> Option<&str> {
        let mut ids = self.universe(side).iter().map(PortSelector::unit_id);
        let first = ids.next()??;
        ids.all(|id| id == Some(first)).then_some(first)
    }
}

impl TryFrom<PatternRecord> for Pattern {
    type Error = WireError;

    fn try_from(record: PatternRecord) -> Result<Self> {
        let mut pattern = Pattern::create(record.universe_a, record.universe_b)?;

        // Tags must name in-universe ports and agree with the kind in the id
        for (id, &tagged) in &record.kinds {
            let port = Port::parse(id)?;
            pattern.side_of(port.id())?;
            if port.kind() != tagged {
                return Err(WireError::KindConflict {
                    port: id.clone(),
                    existing: tagged,
                    requested: port.kind(),
                });
            }
        }

        for c in &record.connections {
            pattern.connect(&c.source, &c.destination, c.weight)?;
        }

        if let Some(id) = record.kinds.keys().find(|id| !pattern.kinds.contains_key(*id)) {
            return Err(WireError::InvalidPortId(format!(
                "{} is tagged but not referenced by any connection",
                id
            )));
        }
        Ok(pattern)
    }
}

impl From<Pattern> for PatternRecord {
    fn from(pattern: Pattern) -> Self {
        Self {
            universe_a: pattern.universe_a,
            universe_b: pattern.universe_b,
            kinds: pattern.kinds,
            connections: pattern.connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitSpec;

    fn port(unit: &str, dir: Direction, kind: PortKind, i: u32) -> Port {
        Port::new(unit, dir, kind, i).unwrap()
    }

    fn pattern_ab() -> Pattern {
        Pattern::from_selector_strings("/a", "/b").unwrap()
    }

    #[test]
    fn test_create_rejects_empty_universe() {
        let a = vec![PortSelector::unit("a").unwrap()];
        assert!(matches!(
            Pattern::create(a.clone(), Vec::new()),
            Err(WireError::InvalidSelector(_))
        ));
        assert!(matches!(
            Pattern::create(Vec::new(), a),
            Err(WireError::InvalidSelector(_))
        ));
        assert!(Pattern::from_selector_strings("", "/b").is_err());
    }

    #[test]
    fn test_create_rejects_malformed_selector() {
        assert!(matches!(
            Pattern::from_selector_strings("/a", "b"),
            Err(WireError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_create_rejects_shared_selector() {
        assert!(Pattern::from_selector_strings("/a,/c", "/c").is_err());
    }

    #[test]
    fn test_create_rejects_overlapping_universes() {
        assert!(matches!(
            Pattern::from_selector_strings("/a", "/a/out"),
            Err(WireError::InvalidSelector(_))
        ));
        assert!(matches!(
            Pattern::from_selector_strings("/b/in/spk/0", "/*/in"),
            Err(WireError::InvalidSelector(_))
        ));
        assert!(Pattern::from_selector_strings("/a/out", "/a/in").is_ok());
    }

    #[test]
    fn test_connect_and_retrieve() {
        let mut p = pattern_ab();
        let src = port("a", Direction::Out, PortKind::Spike, 0);
        let dst = port("b", Direction::In, PortKind::Spike, 3);

        p.connect(&src, &dst, 1.0).unwrap();
        assert_eq!(p.len(), 1);
        assert!(p.contains(src.id(), dst.id()));
        assert!(!p.contains(dst.id(), src.id()));
        assert_eq!(p.kind_of(src.id()), Some(PortKind::Spike));
        assert_eq!(p.kind_of(dst.id()), Some(PortKind::Spike));
    }

    #[test]
    fn test_duplicate_pair_not_duplicated() {
        let mut p = pattern_ab();
        let src = port("a", Direction::Out, PortKind::Graded, 0);
        let dst = port("b", Direction::In, PortKind::Graded, 0);

        p.connect(&src, &dst, 1.0).unwrap();
        p.connect(&src, &dst, 1.0).unwrap();
        assert_eq!(p.len(), 1);

        p.connect(&src, &dst, 0.5).unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p.weight(src.id(), dst.id()), Some(0.5));
    }

    #[test]
    fn test_type_mismatch() {
        let mut p = pattern_ab();
        let src = port("a", Direction::Out, PortKind::Spike, 0);
        let dst = port("b", Direction::In, PortKind::Graded, 0);
        assert!(matches!(
            p.connect(&src, &dst, 1.0),
            Err(WireError::TypeMismatch { .. })
        ));
        assert!(p.is_empty());
        assert_eq!(p.kind_of(src.id()), None);
    }

    #[test]
    fn test_direction_mismatch() {
        let mut p = pattern_ab();
        let out_a = port("a", Direction::Out, PortKind::Spike, 0);
        let in_b = port("b", Direction::In, PortKind::Spike, 0);
        assert!(matches!(
            p.connect(&in_b, &out_a, 1.0),
            Err(WireError::DirectionMismatch { .. })
        ));

        let out_b = port("b", Direction::Out, PortKind::Spike, 0);
        assert!(matches!(
            p.connect(&out_a, &out_b, 1.0),
            Err(WireError::DirectionMismatch { .. })
        ));
        assert!(p.is_empty());
    }

    #[test]
    fn test_port_not_in_universe() {
        let mut p = pattern_ab();
        let src = port("c", Direction::Out, PortKind::Spike, 0);
        let dst = port("b", Direction::In, PortKind::Spike, 0);
        assert!(matches!(
            p.connect(&src, &dst, 1.0),
            Err(WireError::PortNotInUniverse(_))
        ));
    }

    #[test]
    fn test_same_universe_rejected() {
        let mut p = pattern_ab();
        let src = port("a", Direction::Out, PortKind::Spike, 0);
        let dst = port("a", Direction::In, PortKind::Spike, 0);
        assert!(matches!(
            p.connect(&src, &dst, 1.0),
            Err(WireError::PortNotInUniverse(_))
        ));
    }

    #[test]
    fn test_invalid_weight() {
        let mut p = pattern_ab();
        let src = port("a", Direction::Out, PortKind::Spike, 0);
        let dst = port("b", Direction::In, PortKind::Spike, 0);
        assert!(matches!(p.connect(&src, &dst, f32::NAN), Err(WireError::InvalidWeight(_))));
        assert!(matches!(p.connect(&src, &dst, -1.0), Err(WireError::InvalidWeight(_))));
        assert!(p.is_empty());
    }

    #[test]
    fn test_both_directions() {
        let mut p = pattern_ab();
        let a_out = port("a", Direction::Out, PortKind::Spike, 0);
        let b_in = port("b", Direction::In, PortKind::Spike, 0);
        let b_out = port("b", Direction::Out, PortKind::Graded, 1);
        let a_in = port("a", Direction::In, PortKind::Graded, 2);

        p.connect(&a_out, &b_in, 1.0).unwrap();
        p.connect(&b_out, &a_in, 1.0).unwrap();

        assert_eq!(p.from_side(Side::A).count(), 1);
        assert_eq!(p.from_side(Side::B).count(), 1);
        assert_eq!(p.from_side(Side::B).next().unwrap().kind(), PortKind::Graded);
    }

    #[test]
    fn test_range_universe() {
        let mut p = Pattern::from_selector_strings("/a/out/spk/[0:2]", "/b/in").unwrap();
        let dst = port("b", Direction::In, PortKind::Spike, 9);
        assert!(p.connect(&port("a", Direction::Out, PortKind::Spike, 1), &dst, 1.0).is_ok());
        assert!(p.connect(&port("a", Direction::Out, PortKind::Spike, 2), &dst, 1.0).is_err());
    }

    #[test]
    fn test_between_units() {
        let a = UnitSpec::generic("lpu_0", 0, 2).build().unwrap();
        let b = UnitSpec::generic("lpu_1", 1, 2).build().unwrap();
        let p = Pattern::between(&a, &b).unwrap();
        assert_eq!(p.unit_id(Side::A), Some("lpu_0"));
        assert_eq!(p.unit_id(Side::B), Some("lpu_1"));
        assert_eq!(p.universe_selector_string(Side::A), "/lpu_0");

        assert!(Pattern::between(&a, &a).is_err());
    }

    #[test]
    fn test_unit_id_mixed_universe() {
        let p = Pattern::from_selector_strings("/a,/c", "/*/in").unwrap();
        assert_eq!(p.unit_id(Side::A), None);
        assert_eq!(p.unit_id(Side::B), None);
    }

    #[test]
    fn test_json_round_trip_replays_connections() {
        let mut p = pattern_ab();
        let src = port("a", Direction::Out, PortKind::Spike, 4);
        let dst = port("b", Direction::In, PortKind::Spike, 5);
        p.connect(&src, &dst, 1.0).unwrap();

        let json = serde_json::to_string(&p).unwrap();
        let back: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert!(back.contains(src.id(), dst.id()));
        assert_eq!(back.kind_of(dst.id()), Some(PortKind::Spike));
    }

    #[test]
    fn test_json_kind_conflict_rejected() {
        let json = r#"{
            "universe_a": ["/a"],
            "universe_b": ["/b"],
            "kinds": { "/a/out/spk/0": "gpot" },
            "connections": [
                { "source": "/a/out/spk/0", "destination": "/b/in/spk/0", "weight": 1.0 }
            ]
        }"#;
        let err = serde_json::from_str::<Pattern>(json).unwrap_err();
        assert!(err.to_string().contains("Kind conflict"));
    }

    #[test]
    fn test_json_foreign_kind_tags_rejected() {
        let outside = r#"{
            "universe_a": ["/a"],
            "universe_b": ["/b"],
            "kinds": { "/zzz/out/spk/0": "spk" },
            "connections": []
        }"#;
        assert!(serde_json::from_str::<Pattern>(outside).is_err());

        let not_a_port = r#"{
            "universe_a": ["/a"],
            "universe_b": ["/b"],
            "kinds": { "not a port": "gpot" },
            "connections": []
        }"#;
        assert!(serde_json::from_str::<Pattern>(not_a_port).is_err());
    }

    #[test]
    fn test_json_unreferenced_kind_tag_rejected() {
        let json = r#"{
            "universe_a": ["/a"],
            "universe_b": ["/b"],
            "kinds": { "/a/out/spk/1": "spk" },
            "connections": []
        }"#;
        let err = serde_json::from_str::<Pattern>(json).unwrap_err();
        assert!(err.to_string().contains("not referenced"));
    }

    #[test]
    fn test_json_invalid_connection_rejected() {
        let json = r#"{
            "universe_a": ["/a"],
            "universe_b": ["/b"],
            "connections": [
                { "source": "/a/out/spk/0", "destination": "/b/in/gpot/0", "weight": 1.0 }
            ]
        }"#;
        assert!(serde_json::from_str::<Pattern>(json).is_err());
    }
}
