//! Replacement policies.
//!
//! Victim selection lives behind a trait so the cache core stays
//! policy-agnostic. LRU keeps a per-set usage order; Random draws from an
//! xorshift generator and keeps no per-set state at all.

/// Picks victim ways within a set and tracks whatever usage state the
/// policy needs.
pub trait ReplacementPolicy {
    /// Records an access to `way` in `set`, whether a hit or a fresh fill.
    fn update(&mut self, set: usize, way: usize);

    /// Chooses the way in `set` to overwrite next. `valid[i]` tells whether
    /// way `i` currently holds a live entry.
    fn get_victim(&mut self, set: usize, valid: &[bool]) -> usize;
}

/// Least-recently-used. Empty ways are consumed lowest index first; once a
/// set is full, the way touched longest ago is evicted.
pub struct LruPolicy {
    // Per-set way order, least recently used at the front.
    order: Vec<Vec<usize>>,
}

impl LruPolicy {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            order: (0..sets).map(|_| (0..ways).collect()).collect(),
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn update(&mut self, set: usize, way: usize) {
        let order = &mut self.order[set];
        order.retain(|&w| w != way);
        order.push(way);
    }

    fn get_victim(&mut self, set: usize, valid: &[bool]) -> usize {
        if let Some(way) = valid.iter().position(|&v| !v) {
            return way;
        }
        self.order[set].first().copied().unwrap_or(0)
    }
}

// Any nonzero value works as an xorshift64 seed.
const XORSHIFT_SEED: u64 = 88172645463325252;

/// Uniform random victims from a fixed-seed xorshift64 stream, so runs are
/// reproducible. Validity is ignored: an empty way is as likely to be
/// overwritten as a live one.
pub struct RandomPolicy {
    ways: usize,
    state: u64,
}

impl RandomPolicy {
    pub fn new(_sets: usize, ways: usize) -> Self {
        Self {
            ways,
            state: XORSHIFT_SEED,
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn update(&mut self, _set: usize, _way: usize) {}

    fn get_victim(&mut self, _set: usize, _valid: &[bool]) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x as usize) % self.ways
    }
}
