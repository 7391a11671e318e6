//! Random Wiring - Populate a pattern between two units
//!
//! A unit pair is wired with four independent sampling passes, one per
//! (direction, kind):
//!
//! 1. A -> B spiking
//! 2. A -> B graded
//! 3. B -> A spiking
//! 4. B -> A graded
//!
//! Every pass goes through `sample_connections` with the same RNG, in the
//! order above. Kinds are never mixed, so every sampled pair is valid by
//! construction.
//!
//! When many pairs are wired (possibly in parallel), each pair gets its own
//! RNG stream seeded by `pair_seed`, so a pair's wiring does not depend on
//! the order other pairs were built in.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pattern::Pattern;
use crate::port::PortKind;
use crate::sampling::sample_connections;
use crate::unit::PortSource;

/// Weight given to every sampled connection
pub const DEFAULT_WEIGHT: f32 = 1.0;

/// Random wiring configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringConfig {
    /// Spiking connections requested per direction
    pub spike_count: u32,
    /// Graded connections requested per direction
    pub graded_count: u32,
    /// Base seed for all pair RNG streams
    pub seed: u64,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            spike_count: 30,
            graded_count: 30,
            seed: 42,
        }
    }
}

impl WiringConfig {
    pub fn count(&self, kind: PortKind) -> u32 {
        match kind {
            PortKind::Spike => self.spike_count,
            PortKind::Graded => self.graded_count,
        }
    }
}

/// Wire two units with the four sampling passes.
pub fn wire_units<R: Rng + ?Sized>(
    a: &dyn PortSource,
    b: &dyn PortSource,
    config: &WiringConfig,
    rng: &mut R,
) -> Result<Pattern> {
    let mut pattern = Pattern::between(a, b)?;

    for (src, dst) in [(a, b), (b, a)] {
        for kind in PortKind::ALL {
            let requested = config.count(kind);
            let outs = src.out_ports(kind);
            let ins = dst.in_ports(kind);

            let pairs = sample_connections(&outs, &ins, i64::from(requested), rng)?;
            if pairs.len() < requested as usize {
                warn!(
                    "{} -> {} {}: requested {} connections, got {} ({} out, {} in)",
                    src.unit_id(),
                    dst.unit_id(),
                    kind,
                    requested,
                    pairs.len(),
                    outs.len(),
                    ins.len()
                );
            }

            for (s, d) in &pairs {
                pattern.connect(s, d, DEFAULT_WEIGHT)?;
            }
            debug!(
                "{} -> {} {}: {} connections",
                src.unit_id(),
                dst.unit_id(),
                kind,
                pairs.len()
            );
        }
    }

    Ok(pattern)
}

/// Seed for the RNG stream of unit pair (i, j).
///
/// Symmetric in i and j. Mixed with splitmix64 so nearby pairs get
/// unrelated streams.
pub fn pair_seed(seed: u64, i: usize, j: usize) -> u64 {
    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
    let mut z = seed
        .wrapping_add((lo as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add((hi as u64).wrapping_mul(0xD1B5_4A32_D192_ED03));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
