//! Connection sampling
//!
//! The single primitive behind every randomly wired pattern. Both sides are
//! sampled without replacement and paired by draw position, so a result of
//! `n` pairs never reuses a port on either side.
//!
//! The RNG is injected. Given the same RNG state and the same input order
//! the output is identical, which keeps generated networks reproducible.

use rand::seq::index;
use rand::Rng;

use crate::error::{Result, WireError};

/// Draw `min(count, |out_ports|, |in_ports|)` (output, input) pairs.
///
/// Draw order: all output indices first, then all input indices. When the
/// result would be empty the RNG is left untouched.
///
/// Fails only when `count` is negative.
pub fn sample_connections<T, R>(
    out_ports: &[T],
    in_ports: &[T],
    count: i64,
    rng: &mut R,
) -> Result<Vec<(T, T)>>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if count < 0 {
        return Err(WireError::InsufficientPorts(count));
    }

    let n = usize::try_from(count)
        .unwrap_or(usize::MAX)
        .min(out_ports.len())
        .min(in_ports.len());
    if n == 0 {
        return Ok(Vec::new());
    }

    let out_idx = index::sample(rng, out_ports.len(), n);
    let in_idx = index::sample(rng, in_ports.len(), n);

    Ok(out_idx
        .iter()
        .zip(in_idx.iter())
        .map(|(o, i)| (out_ports[o].clone(), in_ports[i].clone()))
        .collect())
}
