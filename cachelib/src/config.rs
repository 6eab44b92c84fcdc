use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::prefetchers::{AdjacentPrefetcher, GenericPrefetcher, NullPrefetcher, SequentialPrefetcher, StridePrefetcher};
use crate::replacement_policies::{GenericPolicy, LeastRecentlyUsed, LeastRecentlyUsedPreferClean, Random};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A full simulation configuration, as given on the command line or in a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub replacement_policy: ReplacementPolicyConfig,
    /// Total cache size in bytes
    pub cache_size: u32,
    #[serde(alias = "lines")]
    pub cache_lines: u32,
    pub associativity: u32,
    #[serde(default)]
    pub prefetch_strategy: PrefetchStrategyConfig,
    /// Only used by the sequential prefetcher
    #[serde(default)]
    pub prefetch_amount: u32,
    /// Seeds the random replacement policy, a fresh seed is drawn when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// The replacement policy - LRU, RAND, or LRU_PREFER_CLEAN
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementPolicyConfig {
    #[serde(rename = "LRU", alias = "lru")]
    LeastRecentlyUsed,
    #[serde(rename = "RAND", alias = "rand")]
    Random,
    #[serde(rename = "LRU_PREFER_CLEAN", alias = "lru_prefer_clean")]
    LeastRecentlyUsedPreferClean,
}

/// The prefetch strategy - NULL, ADJACENT, SEQUENTIAL, or CUSTOM. Defaults to NULL.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrefetchStrategyConfig {
    #[default]
    #[serde(rename = "NULL", alias = "null")]
    Null,
    #[serde(rename = "ADJACENT", alias = "adjacent")]
    Adjacent,
    #[serde(rename = "SEQUENTIAL", alias = "sequential")]
    Sequential,
    #[serde(rename = "CUSTOM", alias = "custom")]
    Custom,
}

impl ReplacementPolicyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ReplacementPolicyConfig::LeastRecentlyUsed => "LRU",
            ReplacementPolicyConfig::Random => "RAND",
            ReplacementPolicyConfig::LeastRecentlyUsedPreferClean => "LRU_PREFER_CLEAN",
        }
    }
}

impl FromStr for ReplacementPolicyConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LRU" => Ok(ReplacementPolicyConfig::LeastRecentlyUsed),
            "RAND" => Ok(ReplacementPolicyConfig::Random),
            "LRU_PREFER_CLEAN" => Ok(ReplacementPolicyConfig::LeastRecentlyUsedPreferClean),
            other => Err(ConfigError::UnknownReplacementPolicy(other.to_string())),
        }
    }
}

impl PrefetchStrategyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            PrefetchStrategyConfig::Null => "NULL",
            PrefetchStrategyConfig::Adjacent => "ADJACENT",
            PrefetchStrategyConfig::Sequential => "SEQUENTIAL",
            PrefetchStrategyConfig::Custom => "CUSTOM",
        }
    }
}

impl FromStr for PrefetchStrategyConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NULL" => Ok(PrefetchStrategyConfig::Null),
            "ADJACENT" => Ok(PrefetchStrategyConfig::Adjacent),
            "SEQUENTIAL" => Ok(PrefetchStrategyConfig::Sequential),
            "CUSTOM" => Ok(PrefetchStrategyConfig::Custom),
            other => Err(ConfigError::UnknownPrefetchStrategy(other.to_string())),
        }
    }
}

/// The shape of a validated cache. Line size and set count are powers of two
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheGeometry {
    pub line_size: u32,
    pub num_sets: u32,
    pub associativity: u32,
}

impl SimulationConfig {
    /// Derives and validates the cache geometry
    ///
    /// line_size = cache_size / cache_lines and num_sets = cache_lines / associativity, both
    /// divisions must be exact and both results must be powers of two
    pub fn geometry(&self) -> ConfigResult<CacheGeometry> {
        if self.cache_size == 0 {
            return Err(ConfigError::Zero("cache size"));
        }
        if self.cache_lines == 0 {
            return Err(ConfigError::Zero("cache lines"));
        }
        if self.associativity == 0 {
            return Err(ConfigError::Zero("associativity"));
        }
        if self.cache_size % self.cache_lines != 0 {
            return Err(ConfigError::UnevenLineSize { cache_size: self.cache_size, cache_lines: self.cache_lines });
        }
        // Also rules out associativity > cache_lines, the quotient would be zero
        if self.associativity > self.cache_lines || self.cache_lines % self.associativity != 0 {
            return Err(ConfigError::UnevenSets { associativity: self.associativity, cache_lines: self.cache_lines });
        }
        let line_size = self.cache_size / self.cache_lines;
        let num_sets = self.cache_lines / self.associativity;
        if !line_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { what: "line size", value: line_size });
        }
        if !num_sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { what: "number of sets", value: num_sets });
        }
        Ok(CacheGeometry { line_size, num_sets, associativity: self.associativity })
    }

    pub fn build_policy(&self, geometry: &CacheGeometry) -> GenericPolicy {
        match self.replacement_policy {
            ReplacementPolicyConfig::LeastRecentlyUsed => {
                GenericPolicy::from(LeastRecentlyUsed::new(geometry.num_sets, geometry.associativity))
            }
            ReplacementPolicyConfig::Random => {
                GenericPolicy::from(Random::new(geometry.associativity, self.seed))
            }
            ReplacementPolicyConfig::LeastRecentlyUsedPreferClean => {
                GenericPolicy::from(LeastRecentlyUsedPreferClean::new(geometry.num_sets, geometry.associativity))
            }
        }
    }

    pub fn build_prefetcher(&self) -> GenericPrefetcher {
        match self.prefetch_strategy {
            PrefetchStrategyConfig::Null => GenericPrefetcher::from(NullPrefetcher),
            PrefetchStrategyConfig::Adjacent => GenericPrefetcher::from(AdjacentPrefetcher),
            PrefetchStrategyConfig::Sequential => GenericPrefetcher::from(SequentialPrefetcher::new(self.prefetch_amount)),
            PrefetchStrategyConfig::Custom => GenericPrefetcher::from(StridePrefetcher::default()),
        }
    }
}

/// The parameter block printed ahead of the statistics. Only meaningful for a valid configuration
impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parameter Info")?;
        writeln!(f, "==============")?;
        writeln!(f, "Replacement Policy: {}", self.replacement_policy.name())?;
        writeln!(f, "Prefetch Strategy: {}", self.prefetch_strategy.name())?;
        writeln!(f, "Prefetch Amount: {}", self.prefetch_amount)?;
        writeln!(f, "Cache Size: {}", self.cache_size)?;
        writeln!(f, "Cache Lines: {}", self.cache_lines)?;
        writeln!(f, "Associativity: {}", self.associativity)?;
        match self.geometry() {
            Ok(geometry) => {
                writeln!(f, "Line Size: {}B", geometry.line_size)?;
                write!(f, "Number of Sets: {}", geometry.num_sets)
            }
            Err(e) => write!(f, "Invalid geometry: {e}"),
        }
    }
}
