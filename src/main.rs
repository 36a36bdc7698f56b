use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use cachesim::{
    cache::{AccessOutcome, Cache, CacheConfig, Policy, decompose},
    experiments::{
        ScenarioResult, associativity_sweep, block_size_sweep, policy_comparison, run_scenarios,
    },
    trace::TraceFile,
};

#[derive(Parser, Debug)]
#[command(name = "cachesim", version, about = "Set-associative cache simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay one trace through one cache and print hit/miss counts.
    Run {
        /// Trace file, one address per line (hex unless prefixed).
        #[arg(short, long)]
        trace: PathBuf,

        /// Total cache size in bytes.
        #[arg(long, default_value_t = 32)]
        size: usize,

        /// Block size in bytes.
        #[arg(long, default_value_t = 4)]
        block: usize,

        /// Ways per set, 1 for direct-mapped.
        #[arg(long, default_value_t = 1)]
        assoc: usize,

        /// Replacement policy.
        #[arg(long, value_enum, default_value_t = Policy::Lru)]
        policy: Policy,

        /// Print every access decision to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare several cache configurations over the same traces.
    Sweep {
        /// Trace files to replay under every scenario.
        #[arg(required = true)]
        traces: Vec<PathBuf>,

        /// Total cache size in bytes.
        #[arg(long, default_value_t = 32)]
        size: usize,

        /// Block size in bytes.
        #[arg(long, default_value_t = 4)]
        block: usize,

        /// Ways per set for the policy and block-size sections.
        #[arg(long, default_value_t = 1)]
        assoc: usize,

        /// Replacement policy for the associativity and block-size sweeps.
        #[arg(long, value_enum, default_value_t = Policy::Lru)]
        policy: Policy,

        /// Associativities to sweep.
        #[arg(long, value_delimiter = ',', default_value = "1,2,4,8")]
        ways: Vec<usize>,

        /// Block sizes to sweep (section skipped when not given).
        #[arg(long, value_delimiter = ',')]
        blocks: Vec<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            trace,
            size,
            block,
            assoc,
            policy,
            verbose,
        } => cmd_run(&trace, size, block, assoc, policy, verbose),
        Commands::Sweep {
            traces,
            size,
            block,
            assoc,
            policy,
            ways,
            blocks,
        } => cmd_sweep(&traces, size, block, assoc, policy, &ways, &blocks),
    }
}

fn cmd_run(
    trace_path: &Path,
    size: usize,
    block: usize,
    assoc: usize,
    policy: Policy,
    verbose: bool,
) -> Result<()> {
    let config = CacheConfig {
        total_size: size,
        block_size: block,
        associativity: assoc,
        policy,
    };
    let mut cache = Cache::new(config)?;
    let trace = TraceFile::load(trace_path)?;

    println!(
        "{size} B cache, {block} B blocks, {assoc}-way, {} sets, {policy} replacement",
        cache.config().num_sets()
    );
    println!("Trace {}: {} addresses", trace.name, trace.addresses.len());

    for &address in &trace.addresses {
        let outcome = cache.access(address);
        if verbose {
            trace_access(address, block, cache.config().num_sets(), outcome);
        }
    }

    let stats = cache.stats();
    println!();
    println!("Hits: {}", stats.hits);
    println!("Misses: {}", stats.misses);
    println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
    Ok(())
}

fn trace_access(address: u64, block_size: usize, num_sets: usize, outcome: AccessOutcome) {
    let (set, tag) = decompose(address, block_size, num_sets);
    match outcome {
        AccessOutcome::Hit { way, .. } => {
            eprintln!("{address:#010x}  set {set:>3}  tag {tag:#x}  hit  way {way}");
        }
        AccessOutcome::Miss { way, .. } => {
            eprintln!("{address:#010x}  set {set:>3}  tag {tag:#x}  miss way {way}");
        }
    }
}

fn cmd_sweep(
    trace_paths: &[PathBuf],
    size: usize,
    block: usize,
    assoc: usize,
    policy: Policy,
    ways: &[usize],
    blocks: &[usize],
) -> Result<()> {
    let traces = load_traces(trace_paths)?;
    println!("Loaded {} trace file(s).", traces.len());

    let base = CacheConfig {
        total_size: size,
        block_size: block,
        associativity: assoc,
        policy,
    };

    let comparison = run_scenarios(&traces, &policy_comparison(&base))?;
    print_section("Policy Comparison", &comparison);

    let assoc_results = run_scenarios(&traces, &associativity_sweep(&base, ways))?;
    print_section("Associativity Sweep", &assoc_results);

    if !blocks.is_empty() {
        let block_results = run_scenarios(&traces, &block_size_sweep(&base, blocks))?;
        print_section("Block Size Sweep", &block_results);
    }
    Ok(())
}

fn print_section(title: &str, results: &[ScenarioResult]) {
    println!("\n== {title} ==");
    for scenario in results {
        println!("  {}", scenario.label);
        for trace in &scenario.trace_results {
            let stats = &trace.stats;
            println!(
                "    {:<14} hit {:>6.2}% miss {:>6.2}%  ({} of {} hit)",
                trace.trace_name,
                stats.hit_rate() * 100.0,
                stats.miss_rate() * 100.0,
                stats.hits,
                stats.accesses,
            );
        }
    }
}

fn load_traces(paths: &[PathBuf]) -> Result<Vec<TraceFile>> {
    let mut traces = Vec::new();
    for path in paths {
        traces.push(TraceFile::load(path)?);
    }
    Ok(traces)
}
