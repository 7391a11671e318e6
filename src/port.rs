//! Ports - Typed, directional endpoints owned by one processing unit
//!
//! A port id is a hierarchical path `/{unit}/{in|out}/{spk|gpot}/{index}`.
//! The id is the only thing the execution manager sees, so `Port::parse`
//! must invert `Port::new` exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};

/// Signal kind carried by a port
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PortKind {
    /// Spiking (binary event per step)
    #[serde(rename = "spk")]
    Spike,
    /// Graded potential (continuous value per step)
    #[serde(rename = "gpot")]
    Graded,
}

impl PortKind {
    pub const ALL: [PortKind; 2] = [PortKind::Spike, PortKind::Graded];

    /// Path segment used in port ids
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spike => "spk",
            Self::Graded => "gpot",
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortKind {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "spk" => Ok(Self::Spike),
            "gpot" => Ok(Self::Graded),
            _ => Err(WireError::InvalidPortId(format!("unknown port kind '{}'", s))),
        }
    }
}

/// Port direction relative to its owning unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(WireError::InvalidPortId(format!("unknown direction '{}'", s))),
        }
    }
}

/// Addressable endpoint on a processing unit
///
/// Kind and direction are fixed at creation; ports are never mutated.
/// Serialized as its id string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Port {
    id: String,
    unit: String,
    direction: Direction,
    kind: PortKind,
    index: u32,
}

impl Port {
    /// Create a port on `unit`. The unit id must be a valid path segment.
    pub fn new(unit: &str, direction: Direction, kind: PortKind, index: u32) -> Result<Self> {
        if !is_valid_segment(unit) {
            return Err(WireError::InvalidPortId(format!("invalid unit id '{}'", unit)));
        }
        Ok(Self {
            id: format!("/{}/{}/{}/{}", unit, direction, kind, index),
            unit: unit.to_string(),
            direction,
            kind,
            index,
        })
    }

    /// Parse a port id of the form `/{unit}/{in|out}/{spk|gpot}/{index}`.
    pub fn parse(id: &str) -> Result<Self> {
        let rest = id
            .strip_prefix('/')
            .ok_or_else(|| WireError::InvalidPortId(format!("'{}' must start with '/'", id)))?;

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 4 {
            return Err(WireError::InvalidPortId(format!(
                "'{}' must have 4 segments, got {}",
                id,
                parts.len()
            )));
        }

        let direction: Direction = parts[1].parse()?;
        let kind: PortKind = parts[2].parse()?;
        let index: u32 = parts[3]
            .parse()
            .map_err(|_| WireError::InvalidPortId(format!("bad index '{}' in '{}'", parts[3], id)))?;

        let port = Self::new(parts[0], direction, kind, index)?;
        // Reject non-canonical spellings such as "/a/in/spk/007"
        if port.id != id {
            return Err(WireError::InvalidPortId(format!("'{}' is not canonical", id)));
        }
        Ok(port)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owning unit id
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// Position among the unit's ports of the same direction and kind
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl TryFrom<String> for Port {
    type Error = WireError;

    fn try_from(id: String) -> Result<Self> {
        Self::parse(&id)
    }
}

impl From<Port> for String {
    fn from(port: Port) -> Self {
        port.id
    }
}

/// A path segment: non-empty, no separators, no whitespace, no selector syntax.
pub(crate) fn is_valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '/' | ',' | '*' | '[' | ']' | ':'))
}
