//! First handle value for a heap instance
//!
//! A handle must only resolve in the heap that issued it. The first handle
//! puts the current UNIX time in seconds in the upper half. The lower half
//! mixes a node identifier, a salt drawn once per process, and a per-instance
//! counter spread by an odd multiplier. Two heaps in one process never share a
//! first handle, a restart in the same second draws a new salt, and two hosts
//! started in the same second start on different values.

use rand::rngs::OsRng;
use rand::RngCore;
use rustc_hash::FxHasher;
use serde::Deserialize;
use std::hash::Hasher;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use super::Handle;

/// Where the lower half of the first handle comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSource {
    /// Host identifier, falling back to the OS random source
    #[default]
    Host,

    /// Per-process random salt only, without the host identifier
    Random,

    /// Exact first handle (tests and reproducible traces)
    Fixed(u64),
}

/// Odd Weyl step: multiplying by it permutes `u32`, so instance numbers map to
/// distinct, widely spaced offsets.
const INSTANCE_STRIDE: u32 = 0x9E37_79B9;

static INSTANCES: AtomicU32 = AtomicU32::new(0);
static PROCESS_SALT: OnceLock<u32> = OnceLock::new();
static HOST_NODE: OnceLock<u32> = OnceLock::new();

/// Compute the first handle for a new heap
///
/// Never returns zero.
pub fn initial_handle(source: SeedSource) -> Handle {
    match source {
        SeedSource::Fixed(seed) => seed.max(1),
        SeedSource::Host => {
            let node = *HOST_NODE.get_or_init(|| host_node().unwrap_or_else(random_node));
            combine(unix_seconds(), node ^ process_salt() ^ next_instance())
        }
        SeedSource::Random => combine(unix_seconds(), process_salt() ^ next_instance()),
    }
}

fn combine(seconds: u64, node: u32) -> Handle {
    // Top bit clear: at least 2^63 handles before exhaustion
    let seed = ((seconds & 0x7FFF_FFFF) << 32) | u64::from(node);
    seed.max(1)
}

fn next_instance() -> u32 {
    INSTANCES
        .fetch_add(1, Ordering::Relaxed)
        .wrapping_mul(INSTANCE_STRIDE)
}

fn process_salt() -> u32 {
    *PROCESS_SALT.get_or_init(random_node)
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn host_node() -> Option<u32> {
    let id = std::fs::read_to_string("/etc/machine-id")
        .ok()
        .map(|contents| contents.trim().to_string())
        .filter(|contents| !contents.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .or_else(|| std::env::var("COMPUTERNAME").ok())
        .filter(|name| !name.is_empty())?;
    Some(fold(id.as_bytes()))
}

fn random_node() -> u32 {
    OsRng.next_u32()
}

fn fold(bytes: &[u8]) -> u32 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    let hash = hasher.finish();
    ((hash >> 32) ^ hash) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_seed() {
        assert_eq!(initial_handle(SeedSource::Fixed(1000)), 1000);
        assert_eq!(initial_handle(SeedSource::Fixed(0)), 1);
    }

    #[test]
    fn test_time_in_upper_half() {
        let seed = combine(5, 0xDEAD_BEEF);
        assert_eq!(seed >> 32, 5);
        assert_eq!(seed as u32, 0xDEAD_BEEF);
    }

    #[test]
    fn test_top_bit_clear() {
        let seed = combine(u64::MAX, u32::MAX);
        assert_eq!(seed >> 63, 0);
    }

    #[test]
    fn test_generated_seeds_are_recent() {
        let now = unix_seconds() & 0x7FFF_FFFF;
        for source in [SeedSource::Host, SeedSource::Random] {
            let seed = initial_handle(source);
            assert!(seed > 0);
            assert!((seed >> 32) >= now);
        }
    }

    #[test]
    fn test_instances_in_one_process_differ() {
        let seeds: std::collections::HashSet<_> = (0..64)
            .map(|_| initial_handle(SeedSource::Host) as u32)
            .collect();
        assert_eq!(seeds.len(), 64);
    }

    #[test]
    fn test_instance_offsets_are_spread() {
        let a = 1_u32.wrapping_mul(INSTANCE_STRIDE);
        let b = 2_u32.wrapping_mul(INSTANCE_STRIDE);
        assert!(a.abs_diff(b) > 1 << 24);
    }

    #[test]
    fn test_fold_is_stable() {
        assert_eq!(fold(b"machine"), fold(b"machine"));
        assert_ne!(fold(b"machine-a"), fold(b"machine-b"));
    }
}
