//! # CacheLib
//!
//! Cachelib is a library for simulating a single level set-associative cache
//!
//! It provides a cache engine which can be parameterised by a replacement policy and a prefetch
//! strategy, and a simulator to run it over traces of `<R|W> <hex address>` references
//!
//! Besides hits and misses it separates compulsory from conflict misses, and counts dirty
//! evictions and prefetched lines

/// Splits addresses into tag, set and offset
pub mod address;

/// Contains the cache lines and the store holding them
pub mod cache;

/// Contains definitions for the simulation configuration, and its validation
pub mod config;

/// Contains the engine tying store, history, replacement policy and prefetcher together
pub mod engine;

/// Error types for configuration and simulation
pub mod error;

/// Tracks which lines have been seen, to classify misses
pub mod history;

/// Trace file reading
pub mod io;

/// Contains the provided prefetch strategies, with a trait for implementing custom ones
pub mod prefetchers;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to run a trace through a configured cache
pub mod simulator;

/// The counters reported after a run
pub mod stats;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
