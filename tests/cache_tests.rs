//! Integration tests for the cache model.

use cachesim::cache::{AccessOutcome, Cache, CacheConfig, Policy, decompose};

/// Builds a config without going through the CLI.
fn config(total: usize, block: usize, assoc: usize, policy: Policy) -> CacheConfig {
    CacheConfig {
        total_size: total,
        block_size: block,
        associativity: assoc,
        policy,
    }
}

/// The default geometry is a 32 B direct-mapped machine with 4 B blocks.
#[test]
fn default_geometry_is_direct_mapped() {
    let config = CacheConfig::default();
    assert_eq!(config.total_size, 32);
    assert_eq!(config.block_size, 4);
    assert_eq!(config.associativity, 1);
    assert_eq!(config.policy, Policy::Lru);
    assert_eq!(config.num_sets(), 8);
}

/// num_sets * associativity * block_size equals total_size for every
/// accepted geometry.
#[test]
fn geometry_invariant_holds() {
    for (total, block, assoc) in [
        (32, 4, 1),
        (32, 4, 2),
        (32, 4, 8),
        (64, 8, 2),
        (1024, 16, 4),
    ] {
        let cfg = config(total, block, assoc, Policy::Lru);
        Cache::new(cfg.clone()).unwrap();
        assert_eq!(cfg.num_sets() * assoc * block, total);
    }
}

/// Zero fields and non-dividing geometries are rejected at construction.
#[test]
fn invalid_geometry_rejected() {
    assert!(Cache::new(config(0, 4, 1, Policy::Lru)).is_err());
    assert!(Cache::new(config(32, 0, 1, Policy::Lru)).is_err());
    assert!(Cache::new(config(32, 4, 0, Policy::Lru)).is_err());
    // 5 B blocks do not divide 32 B.
    assert!(Cache::new(config(32, 5, 1, Policy::Lru)).is_err());
    // 3 ways of 4 B blocks make 12 B sets, which do not divide 32 B.
    assert!(Cache::new(config(32, 4, 3, Policy::Lru)).is_err());
    // A single set would need 32 B but the cache only has 16.
    assert!(Cache::new(config(16, 4, 8, Policy::Lru)).is_err());
}

/// Address decomposition is pure and keeps the set index in range.
#[test]
fn decompose_is_deterministic_and_in_range() {
    let (block_size, num_sets) = (4, 8);
    for address in (0u64..4096).step_by(7) {
        let first = decompose(address, block_size, num_sets);
        let second = decompose(address, block_size, num_sets);
        assert_eq!(first, second);
        assert!(first.0 < num_sets);
    }
}

/// Worked examples with 4 B blocks and 8 sets.
#[test]
fn decompose_worked_examples() {
    assert_eq!(decompose(0, 4, 8), (0, 0));
    assert_eq!(decompose(4, 4, 8), (1, 0));
    assert_eq!(decompose(31, 4, 8), (7, 0));
    // Address 32 wraps back to set 0 with the next tag.
    assert_eq!(decompose(32, 4, 8), (0, 1));
    // Offset bits inside a block never change the mapping.
    assert_eq!(decompose(3, 4, 8), (0, 0));
}

/// The same address twice is a miss then a hit.
#[test]
fn repeat_access_misses_then_hits() {
    let mut cache = Cache::new(CacheConfig::default()).unwrap();
    assert!(!cache.access(0x1000).is_hit());
    assert!(cache.access(0x1000).is_hit());
}

/// Two addresses in the same block hit after one fill.
#[test]
fn same_block_addresses_share_a_line() {
    let mut cache = Cache::new(CacheConfig::default()).unwrap();
    assert!(!cache.access(0x40).is_hit());
    assert!(cache.access(0x41).is_hit());
    assert!(cache.access(0x43).is_hit());
}

/// The sequence [0, 4, 0, 32] on the default machine ends with 1 hit and
/// 3 misses (address 32 evicts set 0's only way).
#[test]
fn worked_example_trace_counts() {
    let mut cache = Cache::new(CacheConfig::default()).unwrap();
    let stats = cache.run_trace(&[0, 4, 0, 32]);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.accesses, 4);
}

/// With k ways, k+1 distinct tags on one set evict the oldest; the newest
/// stays resident.
#[test]
fn lru_evicts_oldest_tag() {
    // 64 B, 4 B blocks, 4 ways: 4 sets. Tags n map to address n * 16,
    // all landing in set 0.
    let mut cache = Cache::new(config(64, 4, 4, Policy::Lru)).unwrap();
    let set0 = |tag: u64| tag * 16;

    for tag in 0..5 {
        assert!(!cache.access(set0(tag)).is_hit());
    }
    assert!(!cache.access(set0(0)).is_hit(), "oldest tag was evicted");
    assert!(cache.access(set0(4)).is_hit(), "newest tag is resident");
}

/// While a set still has empty ways, fills take them lowest index first
/// instead of evicting, no matter how recency is skewed.
#[test]
fn lru_fills_empty_ways_before_evicting() {
    let mut cache = Cache::new(config(64, 4, 4, Policy::Lru)).unwrap();
    let set0 = |tag: u64| tag * 16;

    // Hammer the first tag so it is maximally recent, then add three more.
    assert!(!cache.access(set0(0)).is_hit());
    for _ in 0..8 {
        assert!(cache.access(set0(0)).is_hit());
    }
    for tag in 1..4 {
        assert_eq!(
            cache.access(set0(tag)),
            AccessOutcome::Miss {
                set: 0,
                way: tag as usize
            }
        );
    }
    // All four tags resident now.
    for tag in 0..4 {
        assert!(cache.access(set0(tag)).is_hit());
    }
}

/// A hit refreshes recency: after re-touching the older entry, the other
/// way is the one evicted.
#[test]
fn hit_promotes_entry_under_lru() {
    // 32 B, 4 B blocks, 2 ways: 4 sets. Tags n map to address n * 16.
    let mut cache = Cache::new(config(32, 4, 2, Policy::Lru)).unwrap();
    cache.access(0); // tag 0 fills way 0
    cache.access(16); // tag 1 fills way 1
    cache.access(0); // hit; tag 1 is now least recent
    cache.access(32); // tag 2 evicts tag 1
    assert!(cache.access(0).is_hit());
    assert!(!cache.access(16).is_hit());
}

/// hits + misses always equals the number of addresses processed.
#[test]
fn counters_sum_to_accesses() {
    let addresses: Vec<u64> = (0u64..257).map(|i| (i * 37) % 1024).collect();
    let mut cache = Cache::new(config(128, 8, 2, Policy::Random)).unwrap();
    let stats = cache.run_trace(&addresses);
    assert_eq!(stats.accesses, addresses.len() as u64);
    assert_eq!(stats.hits + stats.misses, stats.accesses);
}

/// An empty stream is not an error and leaves both counters at zero.
#[test]
fn empty_trace_yields_zero_counters() {
    let mut cache = Cache::new(CacheConfig::default()).unwrap();
    let stats = cache.run_trace(&[]);
    assert_eq!((stats.hits, stats.misses), (0, 0));
    assert_eq!(stats.hit_rate(), 0.0);
    assert_eq!(stats.miss_rate(), 0.0);
}

/// With one way per set, LRU and Random drive the same machine.
#[test]
fn direct_mapped_policies_agree() {
    let addresses: Vec<u64> = (0u64..200).map(|i| (i * 13) % 256).collect();
    let mut lru = Cache::new(config(32, 4, 1, Policy::Lru)).unwrap();
    let mut random = Cache::new(config(32, 4, 1, Policy::Random)).unwrap();
    assert_eq!(lru.run_trace(&addresses), random.run_trace(&addresses));
}

/// Random replacement still respects set boundaries: a full sweep of more
/// sets than the cache holds never hits, whichever ways get picked.
#[test]
fn random_misses_on_cold_sweep() {
    let mut cache = Cache::new(config(64, 4, 4, Policy::Random)).unwrap();
    // 64 distinct blocks against a 16-block cache, visited once each.
    let stats = cache.run_trace(&(0u64..64).map(|i| i * 4).collect::<Vec<_>>());
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 64);
}
