//! Config loading - JSON network descriptions
//!
//! ```ignore
//! use lpuwire::config::load_config;
//!
//! let config = load_config("networks/intro.json")?;
//! let network = Network::assemble(&config)?;
//! ```
//!
//! Missing fields take their defaults, so `{}` is the two-unit intro network.

use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::network::NetworkConfig;

/// Load and validate a network config from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<NetworkConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = load_config_str(&text)?;
    debug!("loaded {} units from {}", config.units.len(), path.display());
    Ok(config)
}

/// Parse and validate a network config from JSON text.
pub fn load_config_str(text: &str) -> Result<NetworkConfig> {
    let config: NetworkConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Write a config as pretty JSON.
pub fn save_config<P: AsRef<Path>>(config: &NetworkConfig, path: P) -> Result<()> {
    let text = serde_json::to_string_pretty(config)?;
    std::fs::write(path, text)?;
    Ok(())
}
