//! # lpuwire - Port Connectivity for Multi-Device LPU Networks
//!
//! Describes, validates, and randomly generates the typed connections
//! between Local Processing Units (LPUs) that run on separate devices.
//!
//! ## Core Components
//!
//! - **Port**: Named, directional endpoint (`/unit/dir/kind/index`), spiking or graded
//! - **PortSelector**: Path expression covering one or more ports
//! - **ProcessingUnit**: Unit id, device index, and its fixed port universe
//! - **Pattern**: Validated bipartite connections between two units' universes
//! - **sample_connections**: Seeded sampling without replacement, paired by position
//!
//! ## Design Principles
//!
//! - **Kinds never mix**: spike joins spike, graded joins graded
//! - **Plain data**: units and patterns are immutable values once built
//! - **Injected RNG**: every random draw comes from a caller-supplied, seedable RNG
//! - **Fail fast**: every invalid insertion is rejected synchronously, nothing is retried
//!
//! ## Example
//!
//! ```ignore
//! use lpuwire::{DryRunManager, Network, NetworkConfig};
//!
//! // Two generic LPUs on devices 0 and 1, 30 ports per direction and kind
//! let network = Network::assemble(&NetworkConfig::default())?;
//!
//! let mut manager = DryRunManager::new();
//! network.run(&mut manager, 10_000)?;
//! ```

// Error types
mod error;
pub use error::{Result, WireError};

// Ports and selectors
pub mod port;
pub use port::{Direction, Port, PortKind};

pub mod selector;
pub use selector::{
    join_selectors, parse_selector_string, split_selector_string, to_selector_string,
    PortSelector, SELECTOR_SEPARATOR,
};

// Processing units (port universes)
pub mod unit;
pub use unit::{PortSource, ProcessingUnit, UnitSpec};

// Connectivity patterns
pub mod pattern;
pub use pattern::{Connection, Pattern, Side};

// Sampling and random wiring
pub mod sampling;
pub use sampling::sample_connections;

pub mod wiring;
pub use wiring::{pair_seed, wire_units, WiringConfig, DEFAULT_WEIGHT};

// Network assembly and the execution manager boundary
pub mod network;
pub use network::{Link, Network, NetworkConfig};

pub mod manager;
pub use manager::{DryRunManager, ExecutionManager, ManagerState, Registration};

// Config loading
pub mod config;
pub use config::{load_config, load_config_str, save_config};
