//! Port selectors
//!
//! A selector is a `/`-separated path that identifies one or more ports.
//! Each segment is one of:
//!
//! - a literal (`lpu_0`, `out`, `spk`, `3`)
//! - `*`, matching any single segment
//! - `[a:b]`, matching an integer segment in the half-open range a..b
//!
//! A selector matches a port id when its segments match a prefix of the
//! id's segments, so `/lpu_0` covers every port of `lpu_0` and
//! `/lpu_0/out/spk/[0:30]` covers its first thirty spiking outputs.
//!
//! Multiple selectors are combined into one comma-joined string for the
//! execution manager's routing layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};
use crate::port::{is_valid_segment, Port};

/// Separator between selectors in a combined selector string
pub const SELECTOR_SEPARATOR: char = ',';

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Range(u32, u32),
}

impl Segment {
    fn parse(s: &str) -> Option<Self> {
        if s == "*" {
            return Some(Self::Any);
        }
        if let Some(body) = s.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
            let (lo, hi) = body.split_once(':')?;
            let lo: u32 = lo.parse().ok()?;
            let hi: u32 = hi.parse().ok()?;
            return (lo < hi).then_some(Self::Range(lo, hi));
        }
        is_valid_segment(s).then(|| Self::Literal(s.to_string()))
    }

    fn matches(&self, s: &str) -> bool {
        match self {
            Self::Literal(lit) => lit == s,
            Self::Any => true,
            Self::Range(lo, hi) => s.parse::<u32>().map_or(false, |i| (*lo..*hi).contains(&i)),
        }
    }
}

/// Parsed, validated selector expression
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortSelector {
    raw: String,
    segments: Vec<Segment>,
}

impl PortSelector {
    pub fn parse(raw: &str) -> Result<Self> {
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| WireError::InvalidSelector(format!("'{}' must start with '/'", raw)))?;

        let segments = rest
            .split('/')
            .map(|seg| {
                Segment::parse(seg).ok_or_else(|| {
                    WireError::InvalidSelector(format!("bad segment '{}' in '{}'", seg, raw))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Selector covering every port of one unit
    pub fn unit(unit_id: &str) -> Result<Self> {
        Self::parse(&format!("/{}", unit_id))
    }

    /// Selector matching exactly one port
    pub fn port(port: &Port) -> Self {
        Self {
            raw: port.id().to_string(),
            segments: port
                .id()
                .trim_start_matches('/')
                .split('/')
                .map(|s| Segment::Literal(s.to_string()))
                .collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check whether this selector covers `port_id`.
    pub fn matches(&self, port_id: &str) -> bool {
        let Some(rest) = port_id.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() < self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(parts)
            .all(|(seg, part)| seg.matches(part))
    }

    /// True when every segment is a literal
    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Check whether this selector covers every port `other` covers.
    ///
    /// Only decided for literal `other`; wildcard and range selectors are
    /// never reported as covered.
    pub fn covers(&self, other: &PortSelector) -> bool {
        other.is_literal() && self.matches(other.as_str())
    }

    /// First literal segment, when the selector is pinned to one unit
    pub fn unit_id(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Literal(id)) => Some(id.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for PortSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PortSelector {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PortSelector {
    type Error = WireError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PortSelector> for String {
    fn from(sel: PortSelector) -> Self {
        sel.raw
    }
}

/// Render ports as one comma-joined selector string.
///
/// Empty input gives an empty string; no trailing separator is emitted.
pub fn to_selector_string<'a, I>(ports: I) -> String
where
    I: IntoIterator<Item = &'a Port>,
{
    join_selectors(ports.into_iter().map(Port::id))
}

/// Comma-join selector strings, skipping empty ones.
pub fn join_selectors<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a combined selector string back into its parts.
pub fn split_selector_string(s: &str) -> Vec<&str> {
    s.split(SELECTOR_SEPARATOR).filter(|p| !p.is_empty()).collect()
}

/// Parse a comma-joined selector string into selectors.
pub fn parse_selector_string(s: &str) -> Result<Vec<PortSelector>> {
    split_selector_string(s)
        .into_iter()
        .map(PortSelector::parse)
        .collect()
}
