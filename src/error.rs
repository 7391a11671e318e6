//! Error types for lpuwire

use thiserror::Error;

use crate::port::{Direction, PortKind};

/// Wiring error type
///
/// Every variant is raised synchronously by the offending call. None of them
/// are transient: a failure means the network description is wrong.
#[derive(Debug, Error)]
pub enum WireError {
    /// Malformed selector, or an empty selector universe
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Port identifier that does not parse as `/unit/dir/kind/index`
    #[error("Invalid port id: {0}")]
    InvalidPortId(String),

    /// Source and destination carry different signal kinds
    #[error("Type mismatch: {source_id} is {source_kind}, {destination_id} is {destination_kind}")]
    TypeMismatch {
        source_id: String,
        source_kind: PortKind,
        destination_id: String,
        destination_kind: PortKind,
    },

    /// Source is not an output port or destination is not an input port
    #[error("Direction mismatch: {source_id} ({source_dir}) -> {destination_id} ({destination_dir})")]
    DirectionMismatch {
        source_id: String,
        source_dir: Direction,
        destination_id: String,
        destination_dir: Direction,
    },

    /// Port outside both universes of the pattern
    #[error("Port not in universe: {0}")]
    PortNotInUniverse(String),

    /// Port already tagged with a different kind in the pattern
    #[error("Kind conflict for {port}: tagged {existing}, requested {requested}")]
    KindConflict {
        port: String,
        existing: PortKind,
        requested: PortKind,
    },

    /// Weight is negative or not finite
    #[error("Invalid weight: {0}")]
    InvalidWeight(f32),

    /// Negative sample count
    #[error("Insufficient ports: cannot sample {0} connections")]
    InsufficientPorts(i64),

    /// Invalid network configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Execution manager used out of order
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WireError>;
