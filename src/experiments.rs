use anyhow::Result;

use crate::{
    cache::{Cache, CacheConfig, CacheStats, Policy},
    trace::TraceFile,
};

#[derive(Clone)]
pub struct ScenarioConfig {
    pub label: String, // Label to be printed for the result
    pub config: CacheConfig,
}

pub struct ScenarioResult {
    pub label: String,
    pub trace_results: Vec<TraceResult>,
}

pub struct TraceResult {
    pub trace_name: String,
    pub stats: CacheStats,
}

// Every scenario and trace pair gets a fresh cache.
pub fn run_scenarios(
    traces: &[TraceFile],
    scenarios: &[ScenarioConfig],
) -> Result<Vec<ScenarioResult>> {
    let mut results = Vec::new();
    for scenario in scenarios {
        let mut per_trace = Vec::new();
        for trace in traces {
            let mut cache = Cache::new(scenario.config.clone())?;
            let stats = cache.run_trace(&trace.addresses);
            per_trace.push(TraceResult {
                trace_name: trace.name.clone(),
                stats,
            });
        }
        results.push(ScenarioResult {
            label: scenario.label.clone(),
            trace_results: per_trace,
        });
    }
    Ok(results)
}

pub fn policy_comparison(base: &CacheConfig) -> Vec<ScenarioConfig> {
    [Policy::Lru, Policy::Random]
        .into_iter()
        .map(|policy| {
            let mut cfg = base.clone();
            cfg.policy = policy;
            ScenarioConfig {
                label: format!("{policy} {}-way", cfg.associativity),
                config: cfg,
            }
        })
        .collect()
}

pub fn associativity_sweep(base: &CacheConfig, ways: &[usize]) -> Vec<ScenarioConfig> {
    ways.iter()
        .map(|&assoc| {
            let mut cfg = base.clone();
            cfg.associativity = assoc;
            ScenarioConfig {
                label: format!("{assoc}-way {}", cfg.policy),
                config: cfg,
            }
        })
        .collect()
}

pub fn block_size_sweep(base: &CacheConfig, block_sizes: &[usize]) -> Vec<ScenarioConfig> {
    block_sizes
        .iter()
        .map(|&block| {
            let mut cfg = base.clone();
            cfg.block_size = block;
            ScenarioConfig {
                label: format!("Block {block}B {}", cfg.policy),
                config: cfg,
            }
        })
        .collect()
}
