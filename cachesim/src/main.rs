use std::fs::File;
use std::io::{self, BufReader};
use std::time::Instant;
use clap::Parser;
use env_logger::Env;
use log::info;
use cachelib::config::{PrefetchStrategyConfig, ReplacementPolicyConfig, SimulationConfig};
use cachelib::io::get_reader;
use cachelib::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

/// The trace is read from stdin unless --trace is given. Set RUST_LOG=trace to echo every
/// reference
#[derive(Parser, Debug)]
#[command(about = String::from("Set-associative cache simulator with pluggable replacement and prefetching"))]
struct Args {
    /// LRU, RAND or LRU_PREFER_CLEAN
    #[arg(required_unless_present = "config")]
    replacement_policy: Option<ReplacementPolicyConfig>,
    /// Total cache size in bytes
    #[arg(required_unless_present = "config")]
    cache_size: Option<u32>,
    #[arg(required_unless_present = "config")]
    cache_lines: Option<u32>,
    #[arg(required_unless_present = "config")]
    associativity: Option<u32>,
    /// NULL, ADJACENT, SEQUENTIAL or CUSTOM
    #[arg(required_unless_present = "config")]
    prefetch_strategy: Option<PrefetchStrategyConfig>,
    /// Lines fetched ahead by the SEQUENTIAL strategy
    #[arg(required_unless_present = "config")]
    prefetch_amount: Option<u32>,

    /// Read the configuration from a JSON file instead
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short, long)]
    trace: Option<String>,

    /// Seed for the RAND replacement policy
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {path}: {e}"))?;
            serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"))?
        }
        // clap guarantees these are all present without a config file
        None => SimulationConfig {
            replacement_policy: args.replacement_policy.ok_or("Missing the replacement policy")?,
            cache_size: args.cache_size.ok_or("Missing the cache size")?,
            cache_lines: args.cache_lines.ok_or("Missing the number of cache lines")?,
            associativity: args.associativity.ok_or("Missing the associativity")?,
            prefetch_strategy: args.prefetch_strategy.ok_or("Missing the prefetch strategy")?,
            prefetch_amount: args.prefetch_amount.ok_or("Missing the prefetch amount")?,
            seed: None,
        },
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let config = load_config(&args)?;
    let mut simulator = Simulator::new(config).map_err(|e| e.to_string())?;
    if !args.json {
        println!("{}\n", simulator.config());
    }
    match &args.trace {
        Some(path) => {
            info!("reading the trace from {path}");
            let trace_file = File::open(path).map_err(|e| format!("Couldn't open the trace file at path {path}: {e}"))?;
            simulator.simulate(get_reader(trace_file)?)
        }
        None => {
            info!("reading the trace from stdin");
            simulator.simulate(io::stdin().lock())
        }
    }
    .map_err(|e| format!("Simulation failed: {e}"))?;
    info!("simulated {} accesses in {:?}", simulator.statistics().accesses, simulator.get_execution_time());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&simulator.report()).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        println!("\n{}", simulator.statistics());
    }
    if args.performance {
        let simulation_time = simulator.get_execution_time();
        let total_time = start.elapsed();
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {:?}", simulator.config());
        println!("Lines seen: {}", simulator.engine().history().len());
        println!("Uninitialised cache lines: {}", simulator.get_uninitialised_line_count());
    }
    Ok(())
}
