use std::fmt;

use anyhow::{Result, bail};
use clap::ValueEnum;

use crate::policy::{LruPolicy, RandomPolicy, ReplacementPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    Lru,
    Random,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lru => write!(f, "LRU"),
            Policy::Random => write!(f, "Random"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub total_size: usize,    // in Bytes
    pub block_size: usize,    // in Bytes
    pub associativity: usize, // set to 1 for Direct-Mapped
    pub policy: Policy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            total_size: 32,
            block_size: 4,
            associativity: 1,
            policy: Policy::Lru,
        }
    }
}

impl CacheConfig {
    // Only meaningful once validate() has accepted the geometry.
    pub fn num_sets(&self) -> usize {
        self.total_size / (self.associativity * self.block_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_size == 0 || self.block_size == 0 || self.associativity == 0 {
            bail!(
                "cache geometry must be positive: total {} B, block {} B, {} way(s)",
                self.total_size,
                self.block_size,
                self.associativity
            );
        }
        let set_bytes = match self.associativity.checked_mul(self.block_size) {
            Some(bytes) => bytes,
            None => bail!(
                "cache geometry overflows: {} way(s) of {} B blocks",
                self.associativity,
                self.block_size
            ),
        };
        if self.total_size % set_bytes != 0 {
            bail!(
                "total size {} B is not a whole number of sets ({} way(s) x {} B blocks)",
                self.total_size,
                self.associativity,
                self.block_size
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }

    pub fn miss_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.misses as f64 / self.accesses as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit { set: usize, way: usize },
    Miss { set: usize, way: usize },
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit { .. })
    }
}

/// Splits an address into (set index, tag). Bits below the block size are
/// offset bits and carry no placement information.
pub fn decompose(address: u64, block_size: usize, num_sets: usize) -> (usize, u64) {
    let block_number = address / block_size as u64;
    let set_index = (block_number % num_sets as u64) as usize;
    let tag = block_number / num_sets as u64;
    (set_index, tag)
}

pub struct Cache {
    config: CacheConfig,
    sets: Vec<CacheSet>,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
    num_sets: usize,
}

impl Cache {
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let num_sets = config.num_sets();
        let sets = (0..num_sets)
            .map(|_| CacheSet::new(config.associativity))
            .collect();
        let policy: Box<dyn ReplacementPolicy> = match config.policy {
            Policy::Lru => Box::new(LruPolicy::new(num_sets, config.associativity)),
            Policy::Random => Box::new(RandomPolicy::new(num_sets, config.associativity)),
        };
        Ok(Self {
            config,
            sets,
            policy,
            stats: CacheStats::default(),
            num_sets,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Looks up one address, filling on a miss. Counters and recency state
    /// are updated as a side effect.
    pub fn access(&mut self, address: u64) -> AccessOutcome {
        self.stats.accesses += 1;
        let (set_index, tag) = decompose(address, self.config.block_size, self.num_sets);

        if let Some(way) = self.sets[set_index].find_way(tag) {
            self.stats.hits += 1;
            self.policy.update(set_index, way);
            return AccessOutcome::Hit {
                set: set_index,
                way,
            };
        }

        // Miss: the policy picks the way, the set takes the fill.
        self.stats.misses += 1;
        let occupancy = self.sets[set_index].occupancy();
        let way = self.policy.get_victim(set_index, &occupancy);
        self.sets[set_index].install(way, tag);
        self.policy.update(set_index, way);
        AccessOutcome::Miss {
            set: set_index,
            way,
        }
    }

    pub fn run_trace(&mut self, addresses: &[u64]) -> CacheStats {
        for &address in addresses {
            self.access(address);
        }
        self.stats.clone()
    }
}

#[derive(Clone)]
struct WayEntry {
    tag: u64,
    valid: bool,
}

impl WayEntry {
    fn invalid() -> Self {
        Self {
            tag: 0,
            valid: false,
        }
    }
}

struct CacheSet {
    ways: Vec<WayEntry>,
}

impl CacheSet {
    fn new(associativity: usize) -> Self {
        Self {
            ways: vec![WayEntry::invalid(); associativity],
        }
    }

    fn find_way(&self, tag: u64) -> Option<usize> {
        self.ways.iter().position(|way| way.valid && way.tag == tag)
    }

    fn occupancy(&self) -> Vec<bool> {
        self.ways.iter().map(|way| way.valid).collect()
    }

    fn install(&mut self, way: usize, tag: u64) {
        assert!(
            way < self.ways.len(),
            "victim way {way} out of range for a {}-way set",
            self.ways.len()
        );
        self.ways[way] = WayEntry { tag, valid: true };
    }
}
