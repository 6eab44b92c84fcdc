use thiserror::Error;

/// A configuration which can't describe a set-associative cache. Always reported before any
/// trace processing begins
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown replacement policy {0:?}, expected one of LRU, RAND, LRU_PREFER_CLEAN")]
    UnknownReplacementPolicy(String),
    #[error("unknown prefetch strategy {0:?}, expected one of NULL, ADJACENT, SEQUENTIAL, CUSTOM")]
    UnknownPrefetchStrategy(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("cache size {cache_size} is not a multiple of the line count {cache_lines}")]
    UnevenLineSize { cache_size: u32, cache_lines: u32 },
    #[error("associativity {associativity} must divide the line count {cache_lines}")]
    UnevenSets { associativity: u32, cache_lines: u32 },
    #[error("{what} ({value}) must be a power of two")]
    NotPowerOfTwo { what: &'static str, value: u32 },
}

/// Failures surfaced by the simulator
///
/// Only `InvariantViolation` can come out of the engine itself, the rest belong to the layers
/// feeding it
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("malformed trace record on line {line}: {content:?}")]
    MalformedTrace { line: usize, content: String },
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
    #[error("couldn't read the trace: {0}")]
    Io(#[from] std::io::Error),
}
