//! Processing units - the port universe side of an LPU
//!
//! ## PortSource Trait
//!
//! The ONLY view pattern construction needs of a unit: its id, its device,
//! and its fixed port set. Filtered accessors and selector extraction come
//! for free from the provided methods.
//!
//! ## ProcessingUnit
//!
//! Immutable value built once by `UnitSpec::build` during network assembly.
//! Never resized mid-run.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};
use crate::port::{is_valid_segment, Direction, Port, PortKind};
use crate::selector::{join_selectors, to_selector_string};

/// Read-only port view of a processing unit
pub trait PortSource {
    /// Unique unit id (first segment of every port id)
    fn unit_id(&self) -> &str;

    /// Execution device index the unit is scheduled on
    fn device(&self) -> u32;

    /// Every port owned by the unit, in creation order
    fn ports(&self) -> &[Port];

    /// Output ports of one kind, in index order
    fn out_ports(&self, kind: PortKind) -> Vec<&Port> {
        self.filtered(Direction::Out, kind)
    }

    /// Input ports of one kind, in index order
    fn in_ports(&self, kind: PortKind) -> Vec<&Port> {
        self.filtered(Direction::In, kind)
    }

    fn filtered(&self, direction: Direction, kind: PortKind) -> Vec<&Port> {
        self.ports()
            .iter()
            .filter(|p| p.direction() == direction && p.kind() == kind)
            .collect()
    }

    /// Selector string for the ports of one direction and kind
    fn selector(&self, direction: Direction, kind: PortKind) -> String {
        to_selector_string(self.filtered(direction, kind))
    }

    /// Selector string for all input ports (spiking first, then graded)
    fn in_selector(&self) -> String {
        join_selectors([
            self.selector(Direction::In, PortKind::Spike).as_str(),
            self.selector(Direction::In, PortKind::Graded).as_str(),
        ])
    }

    /// Selector string for all output ports (spiking first, then graded)
    fn out_selector(&self) -> String {
        join_selectors([
            self.selector(Direction::Out, PortKind::Spike).as_str(),
            self.selector(Direction::Out, PortKind::Graded).as_str(),
        ])
    }

    /// Selector string for the whole port universe
    fn all_selector(&self) -> String {
        join_selectors([self.in_selector().as_str(), self.out_selector().as_str()])
    }
}

/// Port counts and placement for one unit (the unit factory input)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Unit id (must be a valid selector segment)
    pub id: String,
    /// Device index
    #[serde(default)]
    pub device: u32,
    #[serde(default)]
    pub in_spike: u32,
    #[serde(default)]
    pub in_graded: u32,
    #[serde(default)]
    pub out_spike: u32,
    #[serde(default)]
    pub out_graded: u32,
}

impl UnitSpec {
    /// Unit with `n` ports for every (direction, kind) combination
    pub fn generic(id: &str, device: u32, n: u32) -> Self {
        Self {
            id: id.to_string(),
            device,
            in_spike: n,
            in_graded: n,
            out_spike: n,
            out_graded: n,
        }
    }

    pub fn count(&self, direction: Direction, kind: PortKind) -> u32 {
        match (direction, kind) {
            (Direction::In, PortKind::Spike) => self.in_spike,
            (Direction::In, PortKind::Graded) => self.in_graded,
            (Direction::Out, PortKind::Spike) => self.out_spike,
            (Direction::Out, PortKind::Graded) => self.out_graded,
        }
    }

    /// Build the unit with its port universe populated.
    pub fn build(&self) -> Result<ProcessingUnit> {
        if !is_valid_segment(&self.id) {
            return Err(WireError::Config(format!("invalid unit id '{}'", self.id)));
        }

        let mut ports = Vec::new();
        for direction in [Direction::In, Direction::Out] {
            for kind in PortKind::ALL {
                for i in 0..self.count(direction, kind) {
                    ports.push(Port::new(&self.id, direction, kind, i)?);
                }
            }
        }

        Ok(ProcessingUnit {
            id: self.id.clone(),
            device: self.device,
            ports,
        })
    }
}

/// Processing unit: id, device, and its fixed port universe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingUnit {
    id: String,
    device: u32,
    ports: Vec<Port>,
}

impl ProcessingUnit {
    /// Wrap an externally produced port set. Every port must belong to `id`.
    pub fn from_ports(id: &str, device: u32, ports: Vec<Port>) -> Result<Self> {
        if let Some(foreign) = ports.iter().find(|p| p.unit() != id) {
            return Err(WireError::PortNotInUniverse(format!(
                "{} does not belong to unit {}",
                foreign, id
            )));
        }
        Ok(Self {
            id: id.to_string(),
            device,
            ports,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl PortSource for ProcessingUnit {
    fn unit_id(&self) -> &str {
        &self.id
    }

    fn device(&self) -> u32 {
        self.device
    }

    fn ports(&self) -> &[Port] {
        &self.ports
    }
}
