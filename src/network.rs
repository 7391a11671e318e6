//! Network assembly - Units, pairwise patterns, manager registration
//!
//! Builds every unit from its `UnitSpec`, then wires every unordered pair
//! (i < j) on its own RNG stream. The result is plain data: nothing here
//! holds hidden mutable state once `assemble` returns.

use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};
use crate::manager::{ExecutionManager, Registration};
use crate::pattern::Pattern;
use crate::port::is_valid_segment;
use crate::unit::{ProcessingUnit, UnitSpec};
use crate::wiring::{pair_seed, wire_units, WiringConfig};

/// Full network description
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub units: Vec<UnitSpec>,
    pub wiring: WiringConfig,
    /// Steps to run
    pub steps: u64,
    /// Step size (s)
    pub dt: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::generic(2, 30)
    }
}

impl NetworkConfig {
    /// `n` generic units `lpu_0..lpu_{n-1}`, unit i on device i, each with
    /// `ports` ports per (direction, kind).
    pub fn generic(n: u32, ports: u32) -> Self {
        Self {
            units: (0..n)
                .map(|i| UnitSpec::generic(&format!("lpu_{}", i), i, ports))
                .collect(),
            wiring: WiringConfig::default(),
            steps: 10_000,
            dt: 1e-4,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.units.len() < 2 {
            return Err(WireError::Config(format!(
                "need at least 2 units, got {}",
                self.units.len()
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for spec in &self.units {
            if !is_valid_segment(&spec.id) {
                return Err(WireError::Config(format!("invalid unit id '{}'", spec.id)));
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(WireError::Config(format!("duplicate unit id '{}'", spec.id)));
            }
        }

        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(WireError::Config(format!("dt must be positive, got {}", self.dt)));
        }
        Ok(())
    }
}

/// Pattern between units `a` and `b` (indices into `Network::units`)
#[derive(Clone, Debug)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub pattern: Pattern,
}

/// Assembled network
#[derive(Clone, Debug)]
pub struct Network {
    units: Vec<ProcessingUnit>,
    links: Vec<Link>,
}

impl Network {
    /// Build all units and wire every unordered pair.
    pub fn assemble(config: &NetworkConfig) -> Result<Self> {
        config.validate()?;

        let units = config
            .units
            .iter()
            .map(UnitSpec::build)
            .collect::<Result<Vec<_>>>()?;

        let mut links = Vec::new();
        for i in 0..units.len() {
            for j in (i + 1)..units.len() {
                let mut rng = ChaCha8Rng::seed_from_u64(pair_seed(config.wiring.seed, i, j));
                let pattern = wire_units(&units[i], &units[j], &config.wiring, &mut rng)?;
                links.push(Link { a: i, b: j, pattern });
            }
        }

        info!(
            "assembled {} units, {} patterns, {} connections",
            units.len(),
            links.len(),
            links.iter().map(|l| l.pattern.len()).sum::<usize>()
        );
        Ok(Self { units, links })
    }

    pub fn units(&self) -> &[ProcessingUnit] {
        &self.units
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn unit(&self, id: &str) -> Option<&ProcessingUnit> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Register every pair with the manager.
    pub fn register<M: ExecutionManager + ?Sized>(&self, manager: &mut M) -> Result<()> {
        for link in &self.links {
            let registration = Registration::new(
                &self.units[link.a],
                &self.units[link.b],
                link.pattern.clone(),
            )?;
            manager.connect(registration)?;
        }
        Ok(())
    }

    /// Register, run for `steps`, and stop.
    pub fn run<M: ExecutionManager + ?Sized>(&self, manager: &mut M, steps: u64) -> Result<()> {
        self.register(manager)?;
        manager.start(steps)?;
        manager.stop()
    }
}
