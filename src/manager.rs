//! Execution manager interface
//!
//! The manager owns device placement and the simulation loop, neither of
//! which lives in this crate. It receives one `Registration` per wired unit
//! pair, keeps the pattern as immutable configuration, and runs for a
//! fixed number of steps between `start` and `stop`.
//!
//! `DryRunManager` implements the contract without executing anything. It
//! checks registrations and lifecycle order, and is what the assembly tool
//! and the tests run against.

use std::collections::HashSet;

use log::{debug, info};

use crate::error::{Result, WireError};
use crate::pattern::{Pattern, Side};
use crate::unit::PortSource;

/// One unit pair handed to the manager
#[derive(Clone, Debug)]
pub struct Registration {
    pub unit_a: String,
    pub unit_b: String,
    pub pattern: Pattern,
    pub device_a: u32,
    pub device_b: u32,
}

impl Registration {
    /// Pair two units with the pattern wired between them.
    ///
    /// The pattern's universes must be pinned to `a` and `b`, in that order.
    pub fn new(a: &dyn PortSource, b: &dyn PortSource, pattern: Pattern) -> Result<Self> {
        let expected = (Some(a.unit_id()), Some(b.unit_id()));
        let actual = (pattern.unit_id(Side::A), pattern.unit_id(Side::B));
        if actual != expected {
            return Err(WireError::Config(format!(
                "pattern universes {:?} do not match units ({}, {})",
                actual,
                a.unit_id(),
                b.unit_id()
            )));
        }

        Ok(Self {
            unit_a: a.unit_id().to_string(),
            unit_b: b.unit_id().to_string(),
            device_a: a.device(),
            device_b: b.device(),
            pattern,
        })
    }

    /// Unordered pair key
    fn key(&self) -> (String, String) {
        if self.unit_a <= self.unit_b {
            (self.unit_a.clone(), self.unit_b.clone())
        } else {
            (self.unit_b.clone(), self.unit_a.clone())
        }
    }
}

/// Contract of the external execution manager
pub trait ExecutionManager {
    /// Register a wired unit pair. Only valid before `start`.
    fn connect(&mut self, registration: Registration) -> Result<()>;

    /// Run the simulation for `steps` discrete time steps.
    fn start(&mut self, steps: u64) -> Result<()>;

    /// Halt the simulation.
    fn stop(&mut self) -> Result<()>;
}

/// Lifecycle state of a manager
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManagerState {
    Idle,
    Running { steps: u64 },
    Stopped,
}

/// Manager that validates and records, but never executes
#[derive(Debug)]
pub struct DryRunManager {
    state: ManagerState,
    registrations: Vec<Registration>,
    pairs: HashSet<(String, String)>,
    steps_run: u64,
}

impl Default for DryRunManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DryRunManager {
    pub fn new() -> Self {
        Self {
            state: ManagerState::Idle,
            registrations: Vec::new(),
            pairs: HashSet::new(),
            steps_run: 0,
        }
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Steps covered by the last completed run
    pub fn steps_run(&self) -> u64 {
        self.steps_run
    }

    /// Distinct devices referenced by the registrations
    pub fn devices(&self) -> Vec<u32> {
        let mut devices: Vec<u32> = self
            .registrations
            .iter()
            .flat_map(|r| [r.device_a, r.device_b])
            .collect();
        devices.sort_unstable();
        devices.dedup();
        devices
    }
}

impl ExecutionManager for DryRunManager {
    fn connect(&mut self, registration: Registration) -> Result<()> {
        if self.state != ManagerState::Idle {
            return Err(WireError::Lifecycle(format!(
                "cannot register {} <-> {} while {:?}",
                registration.unit_a, registration.unit_b, self.state
            )));
        }
        if !self.pairs.insert(registration.key()) {
            return Err(WireError::Config(format!(
                "pair {} <-> {} already registered",
                registration.unit_a, registration.unit_b
            )));
        }

        debug!(
            "registered {} (dev {}) <-> {} (dev {}): {} connections",
            registration.unit_a,
            registration.device_a,
            registration.unit_b,
            registration.device_b,
            registration.pattern.len()
        );
        self.registrations.push(registration);
        Ok(())
    }

    fn start(&mut self, steps: u64) -> Result<()> {
        if self.state != ManagerState::Idle {
            return Err(WireError::Lifecycle(format!("cannot start while {:?}", self.state)));
        }
        info!(
            "starting dry run: {} pairs on {} devices, {} steps",
            self.registrations.len(),
            self.devices().len(),
            steps
        );
        self.state = ManagerState::Running { steps };
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let ManagerState::Running { steps } = self.state else {
            return Err(WireError::Lifecycle(format!("cannot stop while {:?}", self.state)));
        };
        self.steps_run = steps;
        self.state = ManagerState::Stopped;
        info!("dry run stopped after {} steps", steps);
        Ok(())
    }
}
