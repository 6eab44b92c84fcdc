use std::io::BufRead;
use std::time::{Duration, Instant};
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use serde::Serialize;
use crate::config::SimulationConfig;
use crate::engine::{AccessOrigin, CacheEngine, Operation};
use crate::error::SimError;
use crate::stats::Statistics;

lazy_static! {
    static ref TRACE_LINE: Regex = Regex::new(r"^\s*([RW])\s+(?:0[xX])?([0-9a-fA-F]{1,8})\s*$")
        .expect("trace line pattern is valid");
}

/// One reference from a trace
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub op: Operation,
    pub address: u32,
}

/// Parses a `<R|W> <hex address>` trace line. Blank lines parse to `None`
///
/// # Examples
///
/// ```
/// use cachelib::engine::Operation;
/// use cachelib::simulator::{parse_trace_line, TraceRecord};
/// assert_eq!(parse_trace_line("W 0x1f"), Some(TraceRecord { op: Operation::Write, address: 0x1f }));
/// assert_eq!(parse_trace_line("R 400"), Some(TraceRecord { op: Operation::Read, address: 0x400 }));
/// ```
pub fn parse_trace_line(line: &str) -> Option<TraceRecord> {
    let captures = TRACE_LINE.captures(line)?;
    let op = match &captures[1] {
        "W" => Operation::Write,
        _ => Operation::Read,
    };
    // At most 8 hex digits, so this always fits
    let address = u32::from_str_radix(&captures[2], 16).ok()?;
    Some(TraceRecord { op, address })
}

/// The simulator feeds trace records to the engine and collects the results.
///
/// It supports calling simulate multiple times, and will update the time taken to simulate and the
/// results accordingly
pub struct Simulator {
    config: SimulationConfig,
    engine: CacheEngine,
    simulation_time: Duration,
}

/// Everything reported about a run. Serialised for the JSON output
#[derive(Debug, Serialize)]
pub struct SimulationReport<'a> {
    pub parameters: &'a SimulationConfig,
    pub line_size: u32,
    pub num_sets: u32,
    pub statistics: &'a Statistics,
    pub hit_ratio: f64,
}

impl Simulator {
    /// Creates a new simulator for a given configuration, failing if the configuration doesn't
    /// describe a valid cache
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let engine = CacheEngine::from_config(&config)?;
        Ok(Self {
            config,
            engine,
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Simulates every reference of a trace, one `<R|W> <hex address>` record per line
    ///
    /// Stops at the first malformed record or engine failure. References before it stay
    /// counted
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace
    ///
    /// returns: Result<&Statistics, SimError>
    pub fn simulate<R: BufRead>(&mut self, reader: R) -> Result<&Statistics, SimError> {
        let start = Instant::now();
        let result = self.run(reader);
        self.simulation_time += start.elapsed();
        result?;
        info!("simulated {} references", self.engine.statistics().accesses);
        Ok(self.engine.statistics())
    }

    fn run<R: BufRead>(&mut self, reader: R) -> Result<(), SimError> {
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = parse_trace_line(&line).ok_or_else(|| SimError::MalformedTrace {
                line: index + 1,
                content: line.clone(),
            })?;
            self.engine.memory_access(record.address, record.op, AccessOrigin::Demand)?;
        }
        Ok(())
    }

    /// Simulates already parsed records
    pub fn simulate_records(&mut self, records: &[TraceRecord]) -> Result<&Statistics, SimError> {
        let start = Instant::now();
        let result = records
            .iter()
            .try_for_each(|r| self.engine.memory_access(r.address, r.op, AccessOrigin::Demand).map(|_| ()));
        self.simulation_time += start.elapsed();
        result?;
        Ok(self.engine.statistics())
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn engine(&self) -> &CacheEngine {
        &self.engine
    }

    pub fn statistics(&self) -> &Statistics {
        self.engine.statistics()
    }

    /// Gets the number of cache lines which were never filled
    pub fn get_uninitialised_line_count(&self) -> usize {
        self.engine.store().invalid_line_count()
    }

    pub fn report(&self) -> SimulationReport<'_> {
        let decoder = self.engine.decoder();
        SimulationReport {
            parameters: &self.config,
            line_size: decoder.line_size(),
            num_sets: decoder.num_sets(),
            statistics: self.engine.statistics(),
            hit_ratio: self.engine.statistics().hit_ratio(),
        }
    }
}
